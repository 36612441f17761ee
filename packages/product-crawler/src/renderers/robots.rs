//! robots.txt parser and checker.

use std::collections::HashMap;

/// Parsed robots.txt rules.
#[derive(Debug, Clone, Default)]
pub struct RobotsTxt {
    /// Rules per user-agent token (lowercase)
    rules: HashMap<String, AgentRules>,

    /// Rules for `*`
    default_rules: AgentRules,
}

#[derive(Debug, Clone, Default)]
struct AgentRules {
    disallow: Vec<String>,
    allow: Vec<String>,
}

impl AgentRules {
    fn merge(&mut self, other: &AgentRules) {
        self.disallow.extend(other.disallow.iter().cloned());
        self.allow.extend(other.allow.iter().cloned());
    }
}

impl RobotsTxt {
    /// Parse robots.txt content.
    ///
    /// Consecutive `User-agent` lines share the group that follows them.
    pub fn parse(content: &str) -> Self {
        let mut robots = Self::default();
        let mut agents: Vec<String> = Vec::new();
        let mut rules = AgentRules::default();
        let mut in_rules = false;

        for line in content.lines() {
            let line = line.split('#').next().unwrap_or_default().trim();
            let Some((directive, value)) = line.split_once(':') else {
                continue;
            };
            let value = value.trim();

            match directive.trim().to_lowercase().as_str() {
                "user-agent" => {
                    if in_rules {
                        robots.store_group(&agents, &rules);
                        agents.clear();
                        rules = AgentRules::default();
                        in_rules = false;
                    }
                    agents.push(value.to_lowercase());
                }
                "disallow" => {
                    in_rules = true;
                    if !value.is_empty() {
                        rules.disallow.push(value.to_string());
                    }
                }
                "allow" => {
                    in_rules = true;
                    if !value.is_empty() {
                        rules.allow.push(value.to_string());
                    }
                }
                _ => {}
            }
        }
        robots.store_group(&agents, &rules);

        robots
    }

    fn store_group(&mut self, agents: &[String], rules: &AgentRules) {
        for agent in agents {
            if agent == "*" {
                self.default_rules.merge(rules);
            } else {
                self.rules.entry(agent.clone()).or_default().merge(rules);
            }
        }
    }

    /// Check if a path is allowed for a user-agent.
    ///
    /// The group with the longest token contained in the agent applies,
    /// falling back to `*`. Within it the longest matching rule wins; on a
    /// tie `Allow` wins.
    pub fn is_allowed(&self, user_agent: &str, path: &str) -> bool {
        let agent = user_agent.to_lowercase();
        let rules = self
            .rules
            .iter()
            .filter(|(token, _)| !token.is_empty() && agent.contains(token.as_str()))
            .max_by(|(a, _), (b, _)| a.len().cmp(&b.len()).then_with(|| b.cmp(a)))
            .map(|(_, rules)| rules)
            .unwrap_or(&self.default_rules);

        let longest = |patterns: &[String]| {
            patterns
                .iter()
                .filter(|p| path.starts_with(p.as_str()))
                .map(String::len)
                .max()
        };

        match (longest(&rules.allow), longest(&rules.disallow)) {
            (_, None) => true,
            (None, Some(_)) => false,
            (Some(allow), Some(disallow)) => allow >= disallow,
        }
    }
}
