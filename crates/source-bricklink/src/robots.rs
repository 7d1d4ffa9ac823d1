//! Minimal robots.txt rules.
//!
//! Interprets the `User-agent` and `Disallow` directives only, which is
//! all the client needs to honor crawl exclusions. Rules from every group
//! whose user-agent line matches the given agent (or `*`) apply.

/// Disallow rules extracted from a robots.txt file for one user agent.
#[derive(Debug, Clone, Default)]
pub struct RobotsRules {
    disallow: Vec<String>,
}

impl RobotsRules {
    /// Rules that permit every path. Used when robots.txt is unreachable,
    /// matching the common crawler convention of allowing on error.
    #[must_use]
    pub fn allow_all() -> Self {
        Self::default()
    }

    /// Parses robots.txt text, keeping the `Disallow` prefixes that apply
    /// to `agent`.
    #[must_use]
    pub fn parse(text: &str, agent: &str) -> Self {
        let agent = agent.to_lowercase();
        let mut disallow = Vec::new();
        let mut group_applies = false;
        let mut in_agent_lines = false;

        for line in text.lines() {
            let line = line.split('#').next().unwrap_or("").trim();
            if line.is_empty() {
                continue;
            }
            let Some((field, value)) = line.split_once(':') else {
                continue;
            };
            let field = field.trim().to_lowercase();
            let value = value.trim();

            if field == "user-agent" {
                // Consecutive User-agent lines extend one group; a rule
                // line ends it, and the next User-agent starts a new one.
                if !in_agent_lines {
                    group_applies = false;
                }
                in_agent_lines = true;
                let ua = value.to_lowercase();
                if ua == "*" || agent.starts_with(&ua) {
                    group_applies = true;
                }
            } else {
                in_agent_lines = false;
                if field == "disallow" && group_applies && !value.is_empty() {
                    disallow.push(value.to_string());
                }
            }
        }

        Self { disallow }
    }

    /// Returns true when `path` is not under any disallowed prefix.
    #[must_use]
    pub fn is_allowed(&self, path: &str) -> bool {
        !self.disallow.iter().any(|prefix| path.starts_with(prefix.as_str()))
    }
}
