use crate::storage::entities::ProjectId;

/// A resolution target: project identity plus the display name time logs are
/// matched against.
#[derive(Debug, Clone, Copy)]
pub struct MatchTarget<'a> {
    pub id: ProjectId,
    pub name: &'a str,
}

/// Resolves a logged project name to at most one target.
///
/// Rules run in priority order, each scanning targets in input order, and the
/// first hit wins:
/// 1. Exact, case-sensitive name match.
/// 2. Case-insensitive substring match in either direction.
/// 3. A target named `"… (X)"` matches a log written against `X`.
/// 4. A target named `"Base (X)"` matches a log written against `Base`.
///
/// Logged names that survive none of the rules resolve to `None` and the
/// caller decides what to do with the entry.
pub fn resolve_project(logged: &str, targets: &[MatchTarget<'_>]) -> Option<ProjectId> {
    let logged = logged.trim();
    if logged.is_empty() {
        return None;
    }

    if let Some(target) = targets.iter().find(|t| t.name.trim() == logged) {
        return Some(target.id);
    }

    let logged_lower = logged.to_lowercase();

    if let Some(target) = targets.iter().find(|t| {
        let name = t.name.trim().to_lowercase();
        name.contains(&logged_lower) || logged_lower.contains(&name)
    }) {
        return Some(target.id);
    }

    if let Some(target) = targets
        .iter()
        .find(|t| matches!(parenthesized_suffix(t.name), Some(x) if x.to_lowercase() == logged_lower))
    {
        return Some(target.id);
    }

    if let Some(target) = targets
        .iter()
        .find(|t| matches!(base_name(t.name), Some(base) if base.to_lowercase() == logged_lower))
    {
        return Some(target.id);
    }

    None
}

/// `"Writing (Book)"` -> `Some("Book")`.
fn parenthesized_suffix(name: &str) -> Option<&str> {
    let open = name.find('(')?;
    let close = name[open + 1..].find(')')?;
    let inner = name[open + 1..open + 1 + close].trim();
    (!inner.is_empty()).then_some(inner)
}

/// `"Writing (Book)"` -> `Some("Writing")`.
fn base_name(name: &str) -> Option<&str> {
    let open = name.find('(')?;
    if !name.trim_end().ends_with(')') {
        return None;
    }
    let base = name[..open].trim();
    (!base.is_empty()).then_some(base)
}

#[cfg(test)]
mod tests {
    use crate::storage::entities::ProjectId;

    use super::{resolve_project, MatchTarget};

    fn targets(names: &[&'static str]) -> Vec<(ProjectId, &'static str)> {
        names.iter().map(|n| (ProjectId::new(), *n)).collect()
    }

    fn refs<'a>(owned: &'a [(ProjectId, &'static str)]) -> Vec<MatchTarget<'a>> {
        owned
            .iter()
            .map(|(id, name)| MatchTarget { id: *id, name })
            .collect()
    }

    #[test]
    fn test_exact_match_beats_substring() {
        // "Alpha" is also a substring of "Alpha Beta", but the exact rule runs
        // first and scans the whole input before substring matching starts.
        let owned = targets(&["Alpha Beta", "Alpha"]);
        let targets = refs(&owned);

        assert_eq!(resolve_project("Alpha", &targets), Some(owned[1].0));
    }

    #[test]
    fn test_substring_either_direction() {
        let owned = targets(&["Deep Work"]);
        let targets = refs(&owned);

        assert_eq!(resolve_project("deep work sprint", &targets), Some(owned[0].0));
        assert_eq!(resolve_project("DEEP", &targets), Some(owned[0].0));
    }

    #[test]
    fn test_parenthesized_suffix() {
        let owned = targets(&["Writing (Book)"]);
        let targets = refs(&owned);

        assert_eq!(resolve_project("book", &targets), Some(owned[0].0));
    }

    #[test]
    fn test_base_name() {
        let owned = targets(&["Writing (Book)"]);
        let targets = refs(&owned);

        assert_eq!(resolve_project("writing", &targets), Some(owned[0].0));
    }

    #[test]
    fn test_first_target_wins_within_a_rule() {
        let owned = targets(&["Alpha One", "Alpha Two"]);
        let targets = refs(&owned);

        assert_eq!(resolve_project("alpha", &targets), Some(owned[0].0));
    }

    #[test]
    fn test_no_match() {
        let owned = targets(&["Writing (Book)", "Gym"]);
        let targets = refs(&owned);

        assert_eq!(resolve_project("Taxes", &targets), None);
        assert_eq!(resolve_project("", &targets), None);
        assert_eq!(resolve_project("   ", &targets), None);
    }
}
