//! Template rendering for notifications.
//!
//! Rendering is deliberately forgiving: an unresolved `{key}` stays in
//! the output verbatim. Missing variables are a data-quality concern,
//! not a reason to drop a reminder on the floor.

use std::collections::HashMap;

use crate::models::{LocalizedText, NotificationType};

/// Substitute every `{key}` occurrence from `vars`. Keys without a
/// value are left untouched, as is any `{` without a closing brace.
pub fn interpolate(template: &str, vars: &HashMap<String, String>) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let after_open = &rest[open..];
        match after_open.find('}') {
            Some(close) => {
                let key = &after_open[1..close];
                match vars.get(key) {
                    Some(value) => out.push_str(value),
                    None => out.push_str(&after_open[..=close]),
                }
                rest = &after_open[close + 1..];
            }
            None => {
                out.push_str(after_open);
                return out;
            }
        }
    }

    out.push_str(rest);
    out
}

/// A notification's title and body, each in both supported locales.
#[derive(Debug, Clone)]
pub struct NotificationTemplate {
    pub title: LocalizedText,
    pub body: LocalizedText,
}

/// Built-in templates keyed by notification type.
///
/// Trigger jobs pull the raw template here and hand it to the dispatcher
/// together with the variables; interpolation happens at dispatch time,
/// after the recipient's locale has been resolved.
pub struct TemplateCatalog {
    templates: HashMap<NotificationType, NotificationTemplate>,
}

impl TemplateCatalog {
    pub fn new() -> Self {
        let mut templates = HashMap::new();

        templates.insert(
            NotificationType::EventReminder,
            NotificationTemplate {
                title: LocalizedText::new("Reminder: {event_title}", "تذكير: {event_title}"),
                body: LocalizedText::new(
                    "{event_title} starts {starts_at}. We look forward to seeing you!",
                    "يبدأ {event_title} في {starts_at}. نتطلع لرؤيتك!",
                ),
            },
        );

        templates.insert(
            NotificationType::GatheringReminder,
            NotificationTemplate {
                title: LocalizedText::new(
                    "Gathering reminder: {group_name}",
                    "تذكير بالاجتماع: {group_name}",
                ),
                body: LocalizedText::new(
                    "Your group {group_name} meets {starts_at}.",
                    "تجتمع مجموعتك {group_name} في {starts_at}.",
                ),
            },
        );

        templates.insert(
            NotificationType::VisitorSlaEscalation,
            NotificationTemplate {
                title: LocalizedText::new(
                    "Visitor follow-up overdue",
                    "متابعة الزائر متأخرة",
                ),
                body: LocalizedText::new(
                    "{visitor_name} visited {visited_at} and has not been contacted for over {sla_hours} hours.",
                    "زار {visitor_name} في {visited_at} ولم يتم التواصل معه منذ أكثر من {sla_hours} ساعة.",
                ),
            },
        );

        templates.insert(
            NotificationType::AtRiskMember,
            NotificationTemplate {
                title: LocalizedText::new(
                    "Member needs follow-up: {member_name}",
                    "عضو يحتاج إلى متابعة: {member_name}",
                ),
                body: LocalizedText::new(
                    "{member_name} has missed {streak} consecutive gatherings of {group_name}.",
                    "غاب {member_name} عن {streak} اجتماعات متتالية لمجموعة {group_name}.",
                ),
            },
        );

        Self { templates }
    }

    pub fn get(&self, notification_type: NotificationType) -> Option<&NotificationTemplate> {
        self.templates.get(&notification_type)
    }
}

impl Default for TemplateCatalog {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vars(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_interpolate_substitutes_all_occurrences() {
        let rendered = interpolate(
            "{name} meets {name} at {time}",
            &vars(&[("name", "Youth Group"), ("time", "19:00")]),
        );
        assert_eq!(rendered, "Youth Group meets Youth Group at 19:00");
    }

    #[test]
    fn test_interpolate_leaves_unresolved_keys_verbatim() {
        let rendered = interpolate("Hello {name}, see you {when}", &vars(&[("name", "Mina")]));
        assert_eq!(rendered, "Hello Mina, see you {when}");
    }

    #[test]
    fn test_interpolate_unclosed_brace_kept() {
        let rendered = interpolate("broken {name", &vars(&[("name", "x")]));
        assert_eq!(rendered, "broken {name");
    }

    #[test]
    fn test_interpolate_no_placeholders() {
        let rendered = interpolate("plain text", &HashMap::new());
        assert_eq!(rendered, "plain text");
    }

    #[test]
    fn test_interpolate_arabic_template() {
        let rendered = interpolate(
            "تذكير: {event_title}",
            &vars(&[("event_title", "اجتماع الشباب")]),
        );
        assert_eq!(rendered, "تذكير: اجتماع الشباب");
    }

    #[test]
    fn test_catalog_has_trigger_templates() {
        let catalog = TemplateCatalog::new();
        for t in [
            NotificationType::EventReminder,
            NotificationType::GatheringReminder,
            NotificationType::VisitorSlaEscalation,
            NotificationType::AtRiskMember,
        ] {
            let template = catalog.get(t).expect("missing template");
            assert!(!template.title.ar.is_empty());
            assert!(!template.body.ar.is_empty());
        }
        // General notifications carry caller-provided text instead.
        assert!(catalog.get(NotificationType::General).is_none());
    }
}
