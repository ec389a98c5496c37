//! Page model for the checkout flow.
//!
//! Three screens: the landing page with its two entry buttons, the card form
//! (identical for the direct-payment and credit paths), and the outcome
//! panel with its banners and inline validation message.
//!
//! Page states are live views over the rendered page — they hold no field
//! values of their own, and every query goes back to the DOM through the
//! [`Page`] capability surface. Each constructor blocks until its screen's
//! defining marker is visible, so a state object is only ever handed out
//! once the screen it models has actually rendered. A marker that never
//! appears is an infrastructural failure, not a test result.
//!
//! Transitions: landing → form (payment or credit) → outcome. The outcome
//! panel is terminal; a new scenario starts over from the landing page.

use crate::data::CardInput;
use crate::error::{HarnessError, Result};
use crate::page::Page;
use crate::wait::{try_wait_until, WaitConfig, UI_TIMEOUT};
use std::time::Duration;
use tracing::debug;

/// Landing-page button for the direct-payment path.
pub const BUTTON_BUY: &str = "Buy";
/// Landing-page button for the credit path.
pub const BUTTON_CREDIT: &str = "Buy on credit";
/// Submits the card form.
pub const BUTTON_CONTINUE: &str = "Continue";

// Field labels as rendered by the application.
const FIELD_CARD_NUMBER: &str = "Card number";
const FIELD_MONTH: &str = "Month";
const FIELD_YEAR: &str = "Year";
const FIELD_OWNER: &str = "Owner";
const FIELD_CVC: &str = "CVC/CVV";

/// The form's defining marker: its heading renders once the form mounts.
const FORM_MARKER: &str = "h3";
/// The landing page's defining marker.
const START_MARKER: &str = "button";

const SUCCESS_BANNER: &str = ".notification_status_ok";
const ERROR_BANNER: &str = ".notification_status_error";
const ERROR_BANNER_CLOSE: &str = ".notification_status_error .icon";
const INLINE_MESSAGE: &str = ".input__sub";

/// Inline validation message for a malformed field value.
pub const MSG_INVALID_FORMAT: &str = "Invalid format";
/// Inline validation message for a nonexistent expiry month.
pub const MSG_INVALID_EXPIRY: &str = "Invalid card expiry date";
/// Inline validation message for a card expired in a past year.
pub const MSG_CARD_EXPIRED: &str = "Card expired";
/// Inline validation message for a required field left empty.
pub const MSG_FIELD_REQUIRED: &str = "Field is required";

async fn require_marker(page: &Page, marker: &str, what: &str) -> Result<()> {
    let outcome = page
        .wait_visible(marker, WaitConfig::with_timeout(UI_TIMEOUT))
        .await?;

    if outcome.succeeded {
        Ok(())
    } else {
        Err(HarnessError::WaitTimeout {
            condition: format!("{what} marker '{marker}' visible"),
            timeout: UI_TIMEOUT,
        })
    }
}

/// The landing page, offering the two entry paths.
pub struct StartPage<'a> {
    page: &'a Page,
}

impl<'a> StartPage<'a> {
    /// Binds to the freshly opened landing page, waiting for its entry
    /// buttons to render.
    pub async fn attach(page: &'a Page) -> Result<StartPage<'a>> {
        require_marker(page, START_MARKER, "landing page").await?;
        Ok(Self { page })
    }

    /// Enters the direct-payment path.
    pub async fn choose_payment(self) -> Result<CheckoutForm<'a>> {
        debug!("choosing payment entry");
        self.page.click_button(BUTTON_BUY).await?;
        CheckoutForm::attach(self.page).await
    }

    /// Enters the credit path.
    pub async fn choose_credit(self) -> Result<CheckoutForm<'a>> {
        debug!("choosing credit entry");
        self.page.click_button(BUTTON_CREDIT).await?;
        CheckoutForm::attach(self.page).await
    }
}

/// The card form. The payment and credit paths render the same five fields,
/// so one type covers both.
pub struct CheckoutForm<'a> {
    page: &'a Page,
}

impl<'a> CheckoutForm<'a> {
    async fn attach(page: &'a Page) -> Result<CheckoutForm<'a>> {
        require_marker(page, FORM_MARKER, "card form").await?;
        Ok(Self { page })
    }

    /// Writes all five card fields and submits the form.
    ///
    /// Field values are transmitted exactly as given — validity is the
    /// application's concern. Control passes to the [`OutcomePanel`], which
    /// shares the rendered page with the form.
    pub async fn fill(&self, card: &CardInput) -> Result<OutcomePanel<'a>> {
        debug!("filling card form");

        self.page
            .set_labeled_field(FIELD_CARD_NUMBER, &card.number)
            .await?;
        self.page
            .set_labeled_field(FIELD_MONTH, &card.expiry_month)
            .await?;
        self.page
            .set_labeled_field(FIELD_YEAR, &card.expiry_year)
            .await?;
        self.page
            .set_labeled_field(FIELD_OWNER, &card.owner_name)
            .await?;
        self.page.set_labeled_field(FIELD_CVC, &card.cvc).await?;

        self.page.click_button(BUTTON_CONTINUE).await?;

        Ok(OutcomePanel { page: self.page })
    }

    /// Erases all five fields without submitting.
    ///
    /// Select-all + delete semantics; idempotent, so clearing an already
    /// empty form is a no-op.
    pub async fn clear(&self) -> Result<()> {
        for label in [
            FIELD_CARD_NUMBER,
            FIELD_MONTH,
            FIELD_YEAR,
            FIELD_OWNER,
            FIELD_CVC,
        ] {
            self.page.clear_labeled_field(label).await?;
        }
        Ok(())
    }

    /// Reads back the current values of all five fields, in form order.
    pub async fn field_values(&self) -> Result<Vec<String>> {
        let mut values = Vec::with_capacity(5);
        for label in [
            FIELD_CARD_NUMBER,
            FIELD_MONTH,
            FIELD_YEAR,
            FIELD_OWNER,
            FIELD_CVC,
        ] {
            values.push(self.page.labeled_field_value(label).await?);
        }
        Ok(values)
    }
}

/// The terminal outcome panel: success banner, error banner, inline
/// validation message.
///
/// Every query is a bounded wait returning a boolean; none treats "not
/// found" as an error. Only a broken driver propagates.
pub struct OutcomePanel<'a> {
    page: &'a Page,
}

impl OutcomePanel<'_> {
    /// Waits up to `timeout` for the success banner.
    pub async fn success_visible(&self, timeout: Duration) -> Result<bool> {
        let outcome = self
            .page
            .wait_visible(SUCCESS_BANNER, WaitConfig::with_timeout(timeout))
            .await?;
        Ok(outcome.succeeded)
    }

    /// Waits up to `timeout` for the error banner.
    ///
    /// Once observed, the banner is dismissed via its close icon so it
    /// cannot leak into a later assertion on the same page.
    pub async fn error_visible(&self, timeout: Duration) -> Result<bool> {
        let outcome = self
            .page
            .wait_visible(ERROR_BANNER, WaitConfig::with_timeout(timeout))
            .await?;

        if outcome.succeeded {
            debug!("error banner observed, dismissing");
            self.page.click(ERROR_BANNER_CLOSE).await?;
        }

        Ok(outcome.succeeded)
    }

    /// Immediate negative check: true if the success banner is not
    /// currently visible. No wait is involved.
    pub async fn success_not_visible(&self) -> Result<bool> {
        Ok(!self.page.selector_visible(SUCCESS_BANNER).await?)
    }

    /// Waits up to `timeout` for the inline validation message to exactly
    /// equal `expected`.
    pub async fn inline_message_equals(&self, expected: &str, timeout: Duration) -> Result<bool> {
        let outcome = try_wait_until(
            || async {
                let text = self.page.visible_text(INLINE_MESSAGE).await?;
                Ok(text.as_deref() == Some(expected))
            },
            WaitConfig::with_timeout(timeout),
        )
        .await?;
        Ok(outcome.succeeded)
    }

    /// The currently visible inline validation message, if any. Used for
    /// diagnostics when an expectation diverges.
    pub async fn inline_message(&self) -> Result<Option<String>> {
        self.page.visible_text(INLINE_MESSAGE).await
    }
}
