/*
Message Formatter

Turns a NotificationEvent into the Markdown text posted to the chat webhook. Each
notification kind has a fixed Handlebars template: header, separator rule, body
fields, timestamp and a closing rule.

Formatting never fails. Missing payload fields are filled with placeholders before
rendering, and if the template engine itself errors a minimal plain layout is
produced instead. Free-text values are backslash-escaped for Telegram's legacy
Markdown; ids shown in code spans or links only lose stray backticks.
*/

use crate::core::platform::container::ledger::LedgerNetwork;
use crate::core::platform::container::notification::{NotificationEvent, NotificationKind};
use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use handlebars::Handlebars;
use log::error;
use serde_json::{Map, Value};

pub const SEPARATOR: &str = "━━━━━━━━━━━━━━━━━━━━━━";
pub const UNKNOWN_PLACEHOLDER: &str = "Unknown";
pub const NO_MESSAGE_PLACEHOLDER: &str = "No message provided";
pub const FALLBACK_FLAG: &str = "🌍";
pub const USER_AGENT_LIMIT: usize = 100;
pub const ELLIPSIS: &str = "...";
pub const DISPLAY_TIMEZONE: Tz = chrono_tz::America::New_York;

/// Characters with meaning in Telegram's legacy Markdown
const MARKDOWN_SPECIAL: &[char] = &['_', '*', '`', '['];

/// Fields rendered inside code spans or link targets, where escapes would show literally
const VERBATIM_FIELDS: &[&str] = &["accountId", "targetWallet", "fromAccount", "toAccount", "transactionId", "ip"];

const COUNTRY_FLAGS: &[(&str, &str)] = &[
    ("US", "🇺🇸"), ("CA", "🇨🇦"), ("GB", "🇬🇧"), ("DE", "🇩🇪"), ("FR", "🇫🇷"), ("IT", "🇮🇹"), ("ES", "🇪🇸"),
    ("JP", "🇯🇵"), ("CN", "🇨🇳"), ("KR", "🇰🇷"), ("IN", "🇮🇳"), ("AU", "🇦🇺"), ("BR", "🇧🇷"), ("MX", "🇲🇽"),
    ("NL", "🇳🇱"), ("SE", "🇸🇪"), ("NO", "🇳🇴"), ("DK", "🇩🇰"), ("FI", "🇫🇮"), ("RU", "🇷🇺"), ("PL", "🇵🇱"),
    ("TR", "🇹🇷"), ("SA", "🇸🇦"), ("AE", "🇦🇪"), ("SG", "🇸🇬"), ("MY", "🇲🇾"), ("TH", "🇹🇭"), ("VN", "🇻🇳"),
    ("PH", "🇵🇭"), ("ID", "🇮🇩"), ("ZA", "🇿🇦"), ("EG", "🇪🇬"), ("NG", "🇳🇬"), ("AR", "🇦🇷"), ("CL", "🇨🇱"),
    ("CO", "🇨🇴"), ("PE", "🇵🇪"), ("VE", "🇻🇪"), ("UA", "🇺🇦"), ("IL", "🇮🇱"), ("IR", "🇮🇷"), ("IQ", "🇮🇶"),
    ("PK", "🇵🇰"), ("BD", "🇧🇩"), ("LK", "🇱🇰"), ("NP", "🇳🇵"), ("MM", "🇲🇲"), ("KH", "🇰🇭"), ("LA", "🇱🇦"),
];

const ALLOWANCE_APPROVED_TEMPLATE: &str = r#"🎯 **ALLOWANCE APPROVED**
━━━━━━━━━━━━━━━━━━━━━━

📊 **Account Details:**
└ Account ID: `{{accountId}}`
└ Target Wallet: `{{targetWallet}}`
└ Allowance Amount: {{allowanceAmount}} HBAR

✅ **Status:** APPROVED
⏰ **Time:** {{timestamp}}

🔗 **Transaction Details:**
└ [View on HashScan]({{explorerUrl}}/transaction/{{transactionId}})

━━━━━━━━━━━━━━━━━━━━━━"#;

const TRANSFER_SUCCESS_TEMPLATE: &str = r#"💰 **TRANSFER COMPLETED**
━━━━━━━━━━━━━━━━━━━━━━

📋 **Transfer Summary:**
└ From: `{{fromAccount}}`
└ To: `{{toAccount}}`
└ Amount: **{{amount}} HBAR**
└ Network Fee: ~0.5 HBAR

✅ **Status:** SUCCESS
⏰ **Time:** {{timestamp}}

🔗 **Transaction Links:**
└ [View Transfer on HashScan]({{explorerUrl}}/transaction/{{transactionId}})
└ [From Account Details]({{explorerUrl}}/account/{{fromAccount}})
└ [To Account Details]({{explorerUrl}}/account/{{toAccount}})

━━━━━━━━━━━━━━━━━━━━━━"#;

const WEBSITE_VISIT_TEMPLATE: &str = r#"🌐 **WEBSITE VISITOR**
━━━━━━━━━━━━━━━━━━━━━━

👤 **Visitor Details:**
└ Location: {{countryFlag}} {{city}}, {{country}}
└ Region: {{region}}
└ ISP: {{isp}}
└ Timezone: {{timezone}}

📱 **Technical Info:**
└ IP: `{{ip}}`
└ Browser: {{userAgent}}
└ Coordinates: {{lat}}, {{lon}}

⏰ **Time:** {{timestamp}}

━━━━━━━━━━━━━━━━━━━━━━"#;

const GENERIC_TEMPLATE: &str = r#"📢 **NOTIFICATION**
━━━━━━━━━━━━━━━━━━━━━━

📋 **Message:** {{message}}
⏰ **Time:** {{timestamp}}

━━━━━━━━━━━━━━━━━━━━━━"#;

fn template_for(kind: NotificationKind) -> &'static str {
    match kind {
        NotificationKind::AllowanceApproved => ALLOWANCE_APPROVED_TEMPLATE,
        NotificationKind::TransferSuccess => TRANSFER_SUCCESS_TEMPLATE,
        NotificationKind::WebsiteVisit => WEBSITE_VISIT_TEMPLATE,
        NotificationKind::Generic => GENERIC_TEMPLATE,
    }
}

/// Renders notification events into chat messages
#[derive(Debug)]
pub struct MessageFormatter {
    engine: Handlebars<'static>,
    explorer_url: String,
}

impl MessageFormatter {
    /// Create a formatter whose explorer links point at `network`
    pub fn new(network: LedgerNetwork) -> Result<Self, handlebars::TemplateError> {
        let mut engine = Handlebars::new();
        // Output is Markdown, not HTML
        engine.register_escape_fn(handlebars::no_escape);

        for kind in NotificationKind::ALL {
            engine.register_template_string(kind.as_str(), template_for(kind))?;
        }

        Ok(Self {
            engine,
            explorer_url: network.explorer_url(),
        })
    }

    /// Format an event stamped with the current time
    pub fn format(&self, event: &NotificationEvent) -> String {
        self.format_at(event, Utc::now())
    }

    /// Format an event stamped with `now`
    pub fn format_at(&self, event: &NotificationEvent, now: DateTime<Utc>) -> String {
        let timestamp = format_timestamp(now);
        let context = self.render_context(event, &timestamp);

        match self.engine.render(event.kind.as_str(), &context) {
            Ok(text) => text,
            Err(e) => {
                error!("Failed to render {} notification: {}", event.kind, e);
                format!(
                    "{}\n{}\n\n⏰ **Time:** {}\n\n{}",
                    event.kind.header(),
                    SEPARATOR,
                    timestamp,
                    SEPARATOR
                )
            }
        }
    }

    fn render_context(&self, event: &NotificationEvent, timestamp: &str) -> Map<String, Value> {
        let mut context = Map::new();

        for field in event.kind.fields() {
            let value = display_value(event.field(field), UNKNOWN_PLACEHOLDER);
            context.insert(field.to_string(), Value::String(markdown_safe(field, &value)));
        }

        match event.kind {
            NotificationKind::WebsiteVisit => {
                let code = event.field("countryCode").and_then(Value::as_str).unwrap_or_default();
                context.insert("countryFlag".to_string(), Value::String(country_flag(code).to_string()));

                let user_agent = display_value(event.field("userAgent"), UNKNOWN_PLACEHOLDER);
                let user_agent = escape_markdown(&truncate_user_agent(&user_agent));
                context.insert("userAgent".to_string(), Value::String(user_agent));
            }
            NotificationKind::Generic => {
                let message = display_value(event.field("message"), NO_MESSAGE_PLACEHOLDER);
                context.insert("message".to_string(), Value::String(escape_markdown(&message)));
            }
            NotificationKind::AllowanceApproved | NotificationKind::TransferSuccess => {}
        }

        context.insert("timestamp".to_string(), Value::String(timestamp.to_string()));
        context.insert("explorerUrl".to_string(), Value::String(self.explorer_url.clone()));
        context
    }
}

/// Emoji flag for an ISO country code, or a globe for codes outside the table
pub fn country_flag(code: &str) -> &'static str {
    let code = code.trim();
    COUNTRY_FLAGS
        .iter()
        .find(|(iso, _)| iso.eq_ignore_ascii_case(code))
        .map(|(_, flag)| *flag)
        .unwrap_or(FALLBACK_FLAG)
}

/// Cut user agents longer than the limit down to the limit plus an ellipsis
pub fn truncate_user_agent(user_agent: &str) -> String {
    if user_agent.chars().count() <= USER_AGENT_LIMIT {
        return user_agent.to_string();
    }

    let mut truncated: String = user_agent.chars().take(USER_AGENT_LIMIT).collect();
    truncated.push_str(ELLIPSIS);
    truncated
}

/// Short date, medium time in New York, e.g. `1/15/24, 12:30:45 PM`
pub fn format_timestamp(now: DateTime<Utc>) -> String {
    now.with_timezone(&DISPLAY_TIMEZONE)
        .format("%-m/%-d/%y, %-I:%M:%S %p")
        .to_string()
}

/// Backslash-escape Markdown markup so free text renders literally
pub fn escape_markdown(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        if MARKDOWN_SPECIAL.contains(&c) {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

fn markdown_safe(field: &str, value: &str) -> String {
    if VERBATIM_FIELDS.contains(&field) {
        value.replace('`', "")
    } else {
        escape_markdown(value)
    }
}

fn display_value(value: Option<&Value>, placeholder: &str) -> String {
    match value {
        None | Some(Value::Null) => placeholder.to_string(),
        Some(Value::String(s)) if s.trim().is_empty() => placeholder.to_string(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn formatter() -> MessageFormatter {
        MessageFormatter::new(LedgerNetwork::Mainnet).unwrap()
    }

    fn fixed_time() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 15, 17, 30, 45).unwrap()
    }

    #[test]
    fn test_every_kind_formats_with_empty_payload() {
        let formatter = formatter();
        for kind in NotificationKind::ALL {
            let text = formatter.format(&NotificationEvent::new(kind));
            assert!(text.starts_with(kind.header()), "{kind} header missing");
            assert_eq!(text.matches(SEPARATOR).count(), 2, "{kind} separators");
            assert!(text.contains("⏰ **Time:**"));
        }
    }

    #[test]
    fn test_missing_fields_render_placeholders() {
        let formatter = formatter();

        let allowance = formatter.format(&NotificationEvent::new(NotificationKind::AllowanceApproved));
        assert!(allowance.contains("└ Account ID: `Unknown`"));
        assert!(allowance.contains("└ Allowance Amount: Unknown HBAR"));

        let generic = formatter.format(&NotificationEvent::new(NotificationKind::Generic));
        assert!(generic.contains("📋 **Message:** No message provided"));
    }

    #[test]
    fn test_unknown_kind_uses_generic_template() {
        let kind = NotificationKind::from_name("something_else");
        let event = NotificationEvent::new(kind).with_field("message", "hello");
        let text = formatter().format(&event);

        assert!(text.starts_with("📢 **NOTIFICATION**"));
        assert!(text.contains("📋 **Message:** hello"));
    }

    #[test]
    fn test_allowance_message() {
        let event = NotificationEvent::new(NotificationKind::AllowanceApproved)
            .with_field("accountId", "0.0.1001")
            .with_field("targetWallet", "0.0.9177142")
            .with_field("allowanceAmount", 250)
            .with_field("transactionId", "0.0.123456@1705339845000");

        let text = formatter().format_at(&event, fixed_time());

        let expected = "🎯 **ALLOWANCE APPROVED**\n\
━━━━━━━━━━━━━━━━━━━━━━\n\
\n\
📊 **Account Details:**\n\
└ Account ID: `0.0.1001`\n\
└ Target Wallet: `0.0.9177142`\n\
└ Allowance Amount: 250 HBAR\n\
\n\
✅ **Status:** APPROVED\n\
⏰ **Time:** 1/15/24, 12:30:45 PM\n\
\n\
🔗 **Transaction Details:**\n\
└ [View on HashScan](https://hashscan.io/mainnet/transaction/0.0.123456@1705339845000)\n\
\n\
━━━━━━━━━━━━━━━━━━━━━━";
        assert_eq!(text, expected);
    }

    #[test]
    fn test_transfer_links_follow_network() {
        let formatter = MessageFormatter::new(LedgerNetwork::Testnet).unwrap();
        let event = NotificationEvent::new(NotificationKind::TransferSuccess)
            .with_field("fromAccount", "0.0.1001")
            .with_field("toAccount", "0.0.2002")
            .with_field("amount", "12.5")
            .with_field("transactionId", "0.0.123456@1");

        let text = formatter.format(&event);
        assert!(text.contains("└ Amount: **12.5 HBAR**"));
        assert!(text.contains("(https://hashscan.io/testnet/transaction/0.0.123456@1)"));
        assert!(text.contains("(https://hashscan.io/testnet/account/0.0.2002)"));
    }

    #[test]
    fn test_values_are_not_html_escaped() {
        let event = NotificationEvent::message("a < b & \"c\"");
        let text = formatter().format(&event);
        assert!(text.contains("a < b & \"c\""));
    }

    #[test]
    fn test_website_visit_message() {
        let long_agent = "A".repeat(150);
        let event = NotificationEvent::new(NotificationKind::WebsiteVisit)
            .with_field("ip", "203.0.113.7")
            .with_field("city", "Toronto")
            .with_field("country", "Canada")
            .with_field("countryCode", "CA")
            .with_field("region", "Ontario")
            .with_field("lat", 43.65)
            .with_field("lon", -79.38)
            .with_field("userAgent", long_agent);

        let text = formatter().format(&event);
        assert!(text.contains("└ Location: 🇨🇦 Toronto, Canada"));
        assert!(text.contains("└ ISP: Unknown"));
        assert!(text.contains("└ Coordinates: 43.65, -79.38"));
        assert!(text.contains(&format!("└ Browser: {}...", "A".repeat(100))));
    }

    #[test]
    fn test_unlisted_country_gets_globe() {
        let event = NotificationEvent::new(NotificationKind::WebsiteVisit).with_field("countryCode", "IS");
        let text = formatter().format(&event);
        assert!(text.contains("└ Location: 🌍 Unknown, Unknown"));
    }

    #[test]
    fn test_free_text_is_markdown_escaped() {
        let event = NotificationEvent::new(NotificationKind::WebsiteVisit)
            .with_field("ip", "203.0.113.7`")
            .with_field("isp", "Fast_Net [AS1]")
            .with_field("userAgent", "Mozilla_5.0 *bot*");
        let text = formatter().format(&event);

        assert!(text.contains("└ Browser: Mozilla\\_5.0 \\*bot\\*"), "{text}");
        assert!(text.contains("└ ISP: Fast\\_Net \\[AS1]"));
        assert!(text.contains("└ IP: `203.0.113.7`\n"));

        let generic = formatter().format(&NotificationEvent::message("use `cargo_fmt`"));
        assert!(generic.contains("📋 **Message:** use \\`cargo\\_fmt\\`"));
    }

    #[test]
    fn test_code_fields_drop_backticks() {
        let event = NotificationEvent::new(NotificationKind::TransferSuccess)
            .with_field("fromAccount", "0.0.1_001")
            .with_field("toAccount", "`0.0.2002`");
        let text = formatter().format(&event);

        assert!(text.contains("└ From: `0.0.1_001`"));
        assert!(text.contains("└ To: `0.0.2002`"));
        assert!(text.contains("/account/0.0.2002)"));
    }

    #[test]
    fn test_escape_markdown() {
        assert_eq!(escape_markdown("plain 1.5 (x)"), "plain 1.5 (x)");
        assert_eq!(escape_markdown("a_b*c`d[e]"), "a\\_b\\*c\\`d\\[e]");
    }

    #[test]
    fn test_country_flag_lookup() {
        assert_eq!(country_flag("US"), "🇺🇸");
        assert_eq!(country_flag("jp"), "🇯🇵");
        assert_eq!(country_flag("LA"), "🇱🇦");
        assert_eq!(country_flag("DEV"), FALLBACK_FLAG);
        assert_eq!(country_flag(""), FALLBACK_FLAG);
        assert_eq!(COUNTRY_FLAGS.len(), 49);
    }

    #[test]
    fn test_truncate_user_agent() {
        let exact = "x".repeat(USER_AGENT_LIMIT);
        assert_eq!(truncate_user_agent(&exact), exact);
        assert_eq!(truncate_user_agent("curl/8.4.0"), "curl/8.4.0");

        let long = "y".repeat(USER_AGENT_LIMIT + 1);
        let truncated = truncate_user_agent(&long);
        assert_eq!(truncated.chars().count(), USER_AGENT_LIMIT + ELLIPSIS.len());
        assert!(truncated.ends_with("y..."));
    }

    #[test]
    fn test_truncate_counts_characters_not_bytes() {
        let agent = "é".repeat(120);
        let truncated = truncate_user_agent(&agent);
        assert_eq!(truncated, format!("{}...", "é".repeat(100)));
    }

    #[test]
    fn test_timestamp_uses_new_york_time() {
        // EST, UTC-5
        assert_eq!(format_timestamp(fixed_time()), "1/15/24, 12:30:45 PM");
        // EDT, UTC-4
        let summer = Utc.with_ymd_and_hms(2024, 7, 4, 4, 5, 6).unwrap();
        assert_eq!(format_timestamp(summer), "7/4/24, 12:05:06 AM");
    }
}
