//! # Order Notifications
//!
//! Fire-and-forget email dispatch after checkout.
//!
//! ## Delivery Contract
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                  Notification Dispatch Flow                             │
//! │                                                                         │
//! │  Checkout handler                                                      │
//! │       │ order stored, cart cleared, response already decided           │
//! │       ▼                                                                 │
//! │  tokio::spawn(send_order_emails(...))                                  │
//! │       │                                                                 │
//! │       ├── buyer email: "your order is placed"                          │
//! │       └── seller email: "you have a new order"                         │
//! │                                                                         │
//! │  A failed send is logged and swallowed. The order NEVER fails or       │
//! │  rolls back because mail did not go out.                               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use tracing::{info, warn};

use souk_core::Order;

/// Outbound mail seam.
///
/// Object-safe so the app can hold `Arc<dyn Mailer>`. The deployment here
/// ships [`LogMailer`]; a real SMTP implementation plugs in behind the
/// same trait.
pub trait Mailer: Send + Sync {
    /// Sends one message. Implementations report failure via Err; callers
    /// decide whether that failure matters.
    fn send(&self, to: &str, subject: &str, body: &str) -> Result<(), String>;
}

/// Mailer that writes messages to the log instead of a wire.
#[derive(Debug, Default)]
pub struct LogMailer;

impl Mailer for LogMailer {
    fn send(&self, to: &str, subject: &str, body: &str) -> Result<(), String> {
        info!(to = %to, subject = %subject, body_len = body.len(), "Email (logged, not sent)");
        Ok(())
    }
}

/// Sends the buyer and seller notifications for a freshly placed order.
///
/// Each send failure is logged on its own; one failing never stops the
/// other.
pub fn send_order_emails(
    mailer: &dyn Mailer,
    order: &Order,
    buyer_email: &str,
    seller_email: &str,
    listing_title: &str,
) {
    let amount = order.amount();

    let buyer_body = format!(
        "Your order for \"{listing_title}\" has been placed.\n\
         Amount: {amount}\n\
         Delivery: {} {}, {}, {}\n\
         The seller will contact you at {}.",
        order.first_name, order.last_name, order.neighborhood, order.city, order.phone
    );
    if let Err(e) = mailer.send(buyer_email, "Order placed", &buyer_body) {
        warn!(order_id = %order.id, error = %e, "Failed to send buyer notification");
    }

    let seller_body = format!(
        "You have a new order for \"{listing_title}\".\n\
         Amount: {amount}\n\
         Buyer contact: {} {}, {} ({}, {})",
        order.first_name, order.last_name, order.phone, order.neighborhood, order.city
    );
    if let Err(e) = mailer.send(seller_email, "New order received", &seller_body) {
        warn!(order_id = %order.id, error = %e, "Failed to send seller notification");
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
