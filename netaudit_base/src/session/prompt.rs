//! Prompt detection and command output cleanup for interactive CLI shells

/// CLI mode indicated by the prompt terminator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptKind {
    /// `host>`
    UserExec,
    /// `host#`
    Privileged,
    /// `host(config)#`, `host(config-if)#`, ...
    Configuration,
}

/// Matches prompts of one device once its hostname is known
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptMatcher {
    hostname: String,
}

impl PromptMatcher {
    /// Learn the hostname from the first prompt the device prints
    pub fn learn(buffer: &str) -> Option<(Self, PromptKind)> {
        let tail = last_line(buffer);
        let (base, kind) = split_generic_prompt(tail)?;
        Some((
            Self {
                hostname: base.to_string(),
            },
            kind,
        ))
    }

    pub fn hostname(&self) -> &str {
        &self.hostname
    }

    /// Check whether the buffer currently ends at this device's prompt
    pub fn match_tail(&self, buffer: &str) -> Option<PromptKind> {
        let tail = last_line(buffer);
        let rest = tail.strip_prefix(self.hostname.as_str())?;

        if rest == ">" {
            return Some(PromptKind::UserExec);
        }

        match rest.strip_suffix('#')? {
            "" => Some(PromptKind::Privileged),
            mode if mode.starts_with("(config") && mode.ends_with(')') => {
                Some(PromptKind::Configuration)
            }
            _ => None,
        }
    }

    /// Remove the echoed command and the trailing prompt from raw output
    pub fn clean_output(&self, raw: &str, command: &str) -> String {
        let normalized = normalize_line_endings(raw);
        let mut lines: Vec<&str> = normalized.split('\n').collect();

        if let Some(first) = lines.first() {
            if first.trim_end().ends_with(command.trim()) {
                lines.remove(0);
            }
        }

        if let Some(last) = lines.last() {
            if self.match_tail(last).is_some() {
                lines.pop();
            }
        }

        lines.join("\n")
    }
}

/// Last line of the buffer with trailing whitespace removed
fn last_line(buffer: &str) -> &str {
    let trimmed = buffer.trim_end();
    match trimmed.rfind(['\n', '\r']) {
        Some(idx) => &trimmed[idx + 1..],
        None => trimmed,
    }
}

/// Split `host#` / `host>` / `host(config)#` without prior knowledge of the host
fn split_generic_prompt(line: &str) -> Option<(&str, PromptKind)> {
    let terminator = line.chars().last()?;
    let body = &line[..line.len() - terminator.len_utf8()];

    let (base, kind) = match terminator {
        '>' => (body, PromptKind::UserExec),
        '#' => match body.find("(config") {
            Some(idx) if body.ends_with(')') => (&body[..idx], PromptKind::Configuration),
            _ => (body, PromptKind::Privileged),
        },
        _ => return None,
    };

    let valid = !base.is_empty()
        && base.len() <= 64
        && base
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.' | '/' | ':'));

    valid.then_some((base, kind))
}

/// Convert CRLF and stray CR to LF
pub fn normalize_line_endings(text: &str) -> String {
    text.replace("\r\n", "\n").replace('\r', "\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_learn_prompt_kinds() {
        let (matcher, kind) = PromptMatcher::learn("\r\nUser Access Verification\r\nR1>").unwrap();
        assert_eq!(matcher.hostname(), "R1");
        assert_eq!(kind, PromptKind::UserExec);

        let (matcher, kind) = PromptMatcher::learn("core-sw.lab#").unwrap();
        assert_eq!(matcher.hostname(), "core-sw.lab");
        assert_eq!(kind, PromptKind::Privileged);

        let (matcher, kind) = PromptMatcher::learn("R1(config-if)#").unwrap();
        assert_eq!(matcher.hostname(), "R1");
        assert_eq!(kind, PromptKind::Configuration);
    }

    #[test]
    fn test_learn_rejects_non_prompts() {
        assert!(PromptMatcher::learn("Password:").is_none());
        assert!(PromptMatcher::learn("banner motd #").is_none());
        assert!(PromptMatcher::learn("").is_none());
    }

    #[test]
    fn test_match_tail_requires_hostname() {
        let (matcher, _) = PromptMatcher::learn("R1#").unwrap();

        assert_eq!(matcher.match_tail("output\r\nR1#"), Some(PromptKind::Privileged));
        assert_eq!(
            matcher.match_tail("R1(config)#"),
            Some(PromptKind::Configuration)
        );
        assert_eq!(matcher.match_tail("R1>"), Some(PromptKind::UserExec));
        assert_eq!(matcher.match_tail("R2#"), None);
        assert_eq!(matcher.match_tail("R1# partial"), None);
        assert_eq!(matcher.match_tail("interface Gi0/1\n"), None);
    }

    #[test]
    fn test_clean_output_strips_echo_and_prompt() {
        let (matcher, _) = PromptMatcher::learn("R1#").unwrap();
        let raw = "show running-config\r\nBuilding configuration...\r\n!\r\nhostname R1\r\nend\r\nR1#";

        let cleaned = matcher.clean_output(raw, "show running-config");
        assert_eq!(cleaned, "Building configuration...\n!\nhostname R1\nend");
    }

    #[test]
    fn test_clean_output_keeps_unechoed_text() {
        let (matcher, _) = PromptMatcher::learn("R1#").unwrap();
        let cleaned = matcher.clean_output("line one\nline two", "show clock");
        assert_eq!(cleaned, "line one\nline two");
    }
}
