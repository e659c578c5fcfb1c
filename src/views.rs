//! Server-rendered HTML. Deliberately plain: markup only, styling lives in `/assets`.

use crate::{
    gate::VERIFY_ROUTE,
    models::{DonationForm, PRESET_AMOUNTS},
    pin::{ERROR_PULSE_MS, PIN_LENGTH, PinEntry},
};

const SITE_NAME: &str = "MAFF";

/// Escapes text for use in element content and quoted attribute values.
pub fn escape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

fn layout(title: &str, head_extra: &str, body: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>{title} | {SITE_NAME}</title>
<link rel="stylesheet" href="/assets/site.css">
{head_extra}
</head>
<body>
{body}
</body>
</html>"#,
        title = escape(title),
    )
}

fn nav() -> &'static str {
    r#"<header><nav>
<a href="/"><strong>MAFF</strong></a>
<a href="/">Home</a>
<a href="/about">About</a>
<a href="/contact">Contact</a>
<a href="/donate">Donate</a>
</nav></header>"#
}

// Keeps the typed digits as a contiguous prefix of the slots the same way `PinEntry`
// does: a digit typed past the end lands in the first empty slot, backspace on a filled
// slot shifts later digits left, and a paste is spread from the focused slot. The form
// submits once, when the fourth digit lands. A locked (rejected) form takes no input.
const PIN_SCRIPT: &str = r#"<script>
(function () {
  var form = document.getElementById("pin-form");
  if (!form || form.hasAttribute("data-locked")) return;
  var slots = Array.prototype.slice.call(form.querySelectorAll("input[data-slot]"));
  var digits = [];
  var sent = false;
  slots.forEach(function (s) { if (/^[0-9]$/.test(s.value)) digits.push(s.value); });
  function write(index, d) {
    if (index < digits.length) digits[index] = d;
    else if (digits.length < slots.length) digits.push(d);
  }
  function render(focus) {
    slots.forEach(function (s, k) { s.value = digits[k] || ""; });
    slots[Math.min(focus, slots.length - 1)].focus();
    if (!sent && digits.length === slots.length) { sent = true; form.submit(); }
  }
  function spread(i, text) {
    var pasted = text.replace(/[^0-9]/g, "").slice(0, slots.length - i).split("");
    if (!pasted.length) return render(i);
    pasted.forEach(function (d, k) { write(i + k, d); });
    render(pasted.length === 1 ? i + 1 : i + pasted.length);
  }
  slots.forEach(function (slot, i) {
    slot.addEventListener("focus", function () { slot.select(); });
    slot.addEventListener("input", function () { spread(i, slot.value); });
    slot.addEventListener("paste", function (e) {
      e.preventDefault();
      spread(i, (e.clipboardData || window.clipboardData).getData("text"));
    });
    slot.addEventListener("keydown", function (e) {
      if (e.key !== "Backspace") return;
      e.preventDefault();
      if (i < digits.length) { digits.splice(i, 1); render(i); }
      else if (i > 0) slots[i - 1].focus();
    });
  });
})();
</script>"#;

/// verify_page
///
/// The PIN entry form for `entry`'s current state. A rejected entry shows the error and
/// refreshes back to an empty form after the error pulse.
pub fn verify_page(entry: &PinEntry) -> String {
    let locked = entry.is_error_visible();
    let slots = entry.slots();
    let mut inputs = String::new();
    for (index, slot) in slots.iter().enumerate() {
        let value = slot.map(String::from).unwrap_or_default();
        let state = if locked {
            " disabled"
        } else if index == entry.focused() {
            " autofocus"
        } else {
            ""
        };
        inputs.push_str(&format!(
            r#"<input data-slot="{index}" name="d{index}" type="text" inputmode="numeric" pattern="[0-9]*" maxlength="1" autocomplete="off" aria-label="Digit {n}" value="{value}"{state}>"#,
            n = index + 1,
            value = escape(&value),
        ));
        if index == 1 && PIN_LENGTH == 4 {
            inputs.push_str(r#"<span aria-hidden="true">-</span>"#);
        }
        inputs.push('\n');
    }

    let (head_extra, error) = if locked {
        (
            format!(
                r#"<meta http-equiv="refresh" content="{secs};url={VERIFY_ROUTE}">"#,
                secs = ERROR_PULSE_MS / 1_000
            ),
            r#"<p class="error" role="alert">Incorrect PIN. Please try again.</p>"#,
        )
    } else {
        (String::new(), "")
    };

    let body = format!(
        r#"<main class="verify">
<h1>{SITE_NAME}</h1>
<h2>Enter Access Code</h2>
<p>Please enter the 4-digit PIN to access the site</p>
<form id="pin-form" method="post" action="{VERIFY_ROUTE}"{lock}>
{inputs}<noscript><button type="submit"{button_state}>Continue</button></noscript>
</form>
{error}
<p class="hint">If you don&#39;t have a PIN, please contact the site administrator.</p>
</main>
{PIN_SCRIPT}"#,
        lock = if locked { " data-locked" } else { "" },
        button_state = if locked { " disabled" } else { "" },
    );
    layout("Enter Access Code", &head_extra, &body)
}

/// A simple titled page behind the gate.
pub fn content_page(title: &str, paragraphs: &[&str]) -> String {
    let mut body = String::from(nav());
    body.push_str(&format!("\n<main>\n<h1>{}</h1>\n", escape(title)));
    for paragraph in paragraphs {
        body.push_str(&format!("<p>{}</p>\n", escape(paragraph)));
    }
    body.push_str("</main>");
    layout(title, "", &body)
}

/// donate_page
///
/// The donation form. On a failed attempt `form` carries what the donor entered and
/// `alert` the reason, so nothing has to be retyped.
pub fn donate_page(form: &DonationForm, alert: Option<&str>) -> String {
    let selected = if form.amount.is_empty() {
        "custom"
    } else {
        form.amount.as_str()
    };

    let mut amounts = String::new();
    for preset in PRESET_AMOUNTS {
        let value = preset.to_string();
        let checked = if selected == value { " checked" } else { "" };
        amounts.push_str(&format!(
            r#"<label><input type="radio" name="amount" value="{value}"{checked}> ${label}</label>
"#,
            label = format_dollars(preset),
        ));
    }
    let custom_checked = if selected == "custom" { " checked" } else { "" };
    amounts.push_str(&format!(
        r#"<label><input type="radio" name="amount" value="custom"{custom_checked}> Custom</label>
<input type="number" name="custom_amount" min="1" max="999999.99" step="any" placeholder="Enter amount" value="{custom}">
"#,
        custom = escape(&form.custom_amount),
    ));

    let alert = alert
        .map(|message| format!(r#"<div class="alert" role="alert">{}</div>"#, escape(message)))
        .unwrap_or_default();

    let body = format!(
        r#"{nav}
<main>
<h1>Support Our Mission</h1>
<p>Your contribution helps us continue our work and make a positive impact in the community.</p>
{alert}
<form method="post" action="/donate">
<fieldset><legend>Select Amount</legend>
{amounts}</fieldset>
<label for="name">Full Name</label>
<input id="name" name="name" required placeholder="John Doe" value="{name}">
<label for="email">Email</label>
<input id="email" name="email" type="email" required placeholder="john@example.com" value="{email}">
<p>We&#39;ll send your donation receipt to this email</p>
<button type="submit">Donate</button>
</form>
</main>"#,
        nav = nav(),
        name = escape(&form.name),
        email = escape(&form.email),
    );
    layout("Donate", "", &body)
}

pub fn success_page(session_id: Option<&str>) -> String {
    let reference = session_id
        .map(|id| format!("<p>Reference: <code>{}</code></p>", escape(id)))
        .unwrap_or_default();
    let body = format!(
        r#"{nav}
<main>
<h1>Thank You!</h1>
<p>Your donation has been received. A receipt will be sent to your email.</p>
{reference}
<p><a href="/">Return Home</a></p>
</main>"#,
        nav = nav(),
    );
    layout("Thank You", "", &body)
}

pub fn not_found_page() -> String {
    content_page("Page Not Found", &["The page you were looking for does not exist."])
}

/// 2500 -> "2,500"
fn format_dollars(amount: u32) -> String {
    let digits = amount.to_string();
    let mut out = String::new();
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}
