//! Tag-to-category classification table.

/// Category assigned when no rule matches.
pub const FALLBACK_CATEGORY: &str = "other";

/// Ordered rules: the first category whose keyword list intersects the tag
/// set wins. An ordered slice rather than a map, so "first match wins" is
/// deterministic.
const CATEGORY_RULES: &[(&str, &[&str])] = &[
    (
        "setup",
        &[
            "install", "installation", "setup", "deploy", "deployment", "upgrade",
            "migration", "guide", "安装", "部署", "指南", "升级",
        ],
    ),
    (
        "account",
        &[
            "account", "login", "password", "signup", "profile", "registration",
            "账号", "登录", "密码",
        ],
    ),
    (
        "billing",
        &[
            "billing", "payment", "invoice", "price", "pricing", "refund",
            "subscription", "计费", "支付", "退款",
        ],
    ),
    (
        "troubleshooting",
        &[
            "error", "bug", "crash", "failure", "troubleshooting", "fix",
            "diagnostic", "故障", "报错", "排查",
        ],
    ),
    (
        "usage",
        &[
            "usage", "tutorial", "howto", "feature", "faq", "manual",
            "使用", "教程", "功能",
        ],
    ),
    (
        "integration",
        &[
            "api", "integration", "webhook", "sdk", "plugin", "export", "import",
            "集成", "接口",
        ],
    ),
    (
        "security",
        &[
            "security", "privacy", "permission", "encryption", "compliance",
            "安全", "权限", "隐私",
        ],
    ),
];

/// Derive the primary category for a set of lowercased tags.
pub fn categorize_tags<'a>(tags: impl IntoIterator<Item = &'a str>) -> &'static str {
    let tags: Vec<String> = tags.into_iter().map(|t| t.to_lowercase()).collect();
    for (category, keywords) in CATEGORY_RULES {
        if keywords.iter().any(|kw| tags.iter().any(|t| t == kw)) {
            return category;
        }
    }
    FALLBACK_CATEGORY
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic_match() {
        assert_eq!(categorize_tags(["install"]), "setup");
        assert_eq!(categorize_tags(["refund"]), "billing");
        assert_eq!(categorize_tags(["api"]), "integration");
    }

    #[test]
    fn test_case_insensitive() {
        assert_eq!(categorize_tags(["Install", "GUIDE"]), "setup");
    }

    #[test]
    fn test_chinese_tags() {
        assert_eq!(categorize_tags(["安装", "指南"]), "setup");
        assert_eq!(categorize_tags(["退款"]), "billing");
    }

    #[test]
    fn test_first_rule_wins() {
        // Both "billing" and "setup" keywords present; "setup" is listed first.
        assert_eq!(categorize_tags(["billing", "install"]), "setup");
    }

    #[test]
    fn test_fallback() {
        assert_eq!(categorize_tags(["quantum", "teleportation"]), FALLBACK_CATEGORY);
        assert_eq!(categorize_tags([]), FALLBACK_CATEGORY);
    }
}
