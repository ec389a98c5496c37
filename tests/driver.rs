//! Driver-level integration tests against data-URL fixture pages.
//!
//! These exercise the page model and capability surface without the real
//! application: a fixture page mimics the checkout markup (labeled fields,
//! entry buttons, banners, inline message) and reacts to clicks the way the
//! application does. Requires Chrome; run with:
//! cargo test --test driver -- --ignored

use checkout_e2e::{
    BrowserSession, BrowserSessionConfig, CardInput, ExternalServer, Navigator,
};
use std::time::Duration;

const FIXTURE: &str = r#"
<!DOCTYPE html>
<html>
<head>
    <title>Checkout Fixture</title>
    <style>.hidden { display: none; }</style>
</head>
<body>
    <div id="landing">
        <button>Buy</button>
        <button>Buy on credit</button>
    </div>
    <div id="form" class="hidden">
        <h3>Payment by card</h3>
        <div><span>Card number</span><input class="input__control"></div>
        <div><span>Month</span><input class="input__control"></div>
        <div><span>Year</span><input class="input__control"></div>
        <div><span>Owner</span><input class="input__control"></div>
        <div><span>CVC/CVV</span><input class="input__control"></div>
        <span class="input__sub hidden">Invalid format</span>
        <button>Continue</button>
    </div>
    <div class="notification_status_ok hidden">Operation approved by the bank.</div>
    <div class="notification_status_error hidden">
        Operation declined. <span class="icon">x</span>
    </div>
    <script>
        const MODE = '__MODE__';
        document.querySelectorAll('#landing button').forEach((button) => {
            button.addEventListener('click', () => {
                document.getElementById('landing').classList.add('hidden');
                document.getElementById('form').classList.remove('hidden');
            });
        });
        const buttons = Array.from(document.querySelectorAll('#form button'));
        const continueButton = buttons.find((b) => b.textContent.trim() === 'Continue');
        continueButton.addEventListener('click', () => {
            if (MODE === 'inline') {
                document.querySelector('.input__sub').classList.remove('hidden');
                return;
            }
            const banner = MODE === 'success'
                ? '.notification_status_ok'
                : '.notification_status_error';
            // Banners appear only after the (simulated) backend round trip.
            setTimeout(() => {
                document.querySelector(banner).classList.remove('hidden');
            }, 300);
        });
        document.querySelector('.notification_status_error .icon')
            .addEventListener('click', (event) => {
                event.target.closest('.notification_status_error').classList.add('hidden');
            });
    </script>
</body>
</html>
"#;

fn fixture_url(mode: &str) -> String {
    let html = FIXTURE.replace("__MODE__", mode);
    format!("data:text/html,{}", urlencoding::encode(&html))
}

async fn fixture_navigator(session: &BrowserSession, mode: &str) -> Navigator {
    let page = session.new_page().await.expect("failed to create page");
    Navigator::new(page, ExternalServer::new(fixture_url(mode)))
}

#[tokio::test]
#[ignore] // Requires Chrome to be installed
async fn payment_path_reaches_form_and_success_banner() {
    let session = BrowserSession::launch(BrowserSessionConfig::default())
        .await
        .expect("failed to launch");

    let navigator = fixture_navigator(&session, "success").await;
    let start = navigator.open_start().await.expect("landing page");
    let form = start.choose_payment().await.expect("card form");
    let outcome = form.fill(&CardInput::approved()).await.expect("submit");

    assert!(
        outcome
            .success_visible(Duration::from_secs(5))
            .await
            .expect("driver alive"),
        "success banner should appear after the simulated delay"
    );

    session.close().await.expect("failed to close");
}

#[tokio::test]
#[ignore]
async fn error_banner_is_observed_and_dismissed() {
    let session = BrowserSession::launch(BrowserSessionConfig::default())
        .await
        .expect("failed to launch");

    let navigator = fixture_navigator(&session, "error").await;
    let start = navigator.open_start().await.expect("landing page");
    let form = start.choose_credit().await.expect("card form");
    let outcome = form.fill(&CardInput::declined()).await.expect("submit");

    assert!(
        outcome
            .error_visible(Duration::from_secs(5))
            .await
            .expect("driver alive"),
        "error banner should appear"
    );

    // Observation dismisses the banner so it cannot leak into later checks.
    assert!(
        !navigator
            .page()
            .selector_visible(".notification_status_error")
            .await
            .expect("driver alive"),
        "error banner should be dismissed after observation"
    );
    assert!(
        outcome.success_not_visible().await.expect("driver alive"),
        "success banner should never appear in the error mode"
    );

    session.close().await.expect("failed to close");
}

#[tokio::test]
#[ignore]
async fn inline_message_matches_exact_text_only() {
    let session = BrowserSession::launch(BrowserSessionConfig::default())
        .await
        .expect("failed to launch");

    let navigator = fixture_navigator(&session, "inline").await;
    let start = navigator.open_start().await.expect("landing page");
    let form = start.choose_payment().await.expect("card form");
    let outcome = form
        .fill(&CardInput::approved().with_month("1"))
        .await
        .expect("submit");

    assert!(
        outcome
            .inline_message_equals("Invalid format", Duration::from_secs(5))
            .await
            .expect("driver alive"),
        "inline message should equal the expected text"
    );
    assert!(
        !outcome
            .inline_message_equals("Some other message", Duration::from_millis(500))
            .await
            .expect("driver alive"),
        "a different expected text must not match"
    );
    assert_eq!(
        outcome.inline_message().await.expect("driver alive"),
        Some("Invalid format".to_string())
    );

    session.close().await.expect("failed to close");
}

#[tokio::test]
#[ignore]
async fn fill_writes_all_five_fields() {
    let session = BrowserSession::launch(BrowserSessionConfig::default())
        .await
        .expect("failed to launch");

    let navigator = fixture_navigator(&session, "success").await;
    let start = navigator.open_start().await.expect("landing page");
    let form = start.choose_payment().await.expect("card form");

    let card = CardInput::approved()
        .with_month("01")
        .with_year("28")
        .with_owner("Jane Doe")
        .with_cvc("123");
    form.fill(&card).await.expect("submit");

    assert_eq!(
        form.field_values().await.expect("driver alive"),
        vec![
            card.number.clone(),
            "01".to_string(),
            "28".to_string(),
            "Jane Doe".to_string(),
            "123".to_string(),
        ]
    );

    session.close().await.expect("failed to close");
}

#[tokio::test]
#[ignore]
async fn clear_is_idempotent() {
    let session = BrowserSession::launch(BrowserSessionConfig::default())
        .await
        .expect("failed to launch");

    let navigator = fixture_navigator(&session, "success").await;
    let start = navigator.open_start().await.expect("landing page");
    let form = start.choose_payment().await.expect("card form");

    let page = navigator.page();
    page.set_labeled_field("Card number", "4444 4444 4444 4441")
        .await
        .expect("set number");
    page.set_labeled_field("Owner", "Jane Doe")
        .await
        .expect("set owner");

    form.clear().await.expect("first clear");
    let after_first = form.field_values().await.expect("driver alive");
    assert!(after_first.iter().all(String::is_empty));

    // Second clear on already-empty fields is a no-op.
    form.clear().await.expect("second clear");
    let after_second = form.field_values().await.expect("driver alive");
    assert!(after_second.iter().all(String::is_empty));

    session.close().await.expect("failed to close");
}
