use log::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PruneStats {
    pub before: usize,
    pub after: usize,
}

impl PruneStats {
    pub fn changed(&self) -> bool {
        self.before != self.after
    }
}

/// Drop user rules that the defaults already cover.
///
/// A user rule goes when it equals a default rule, or when it starts with the
/// prefix of a default `name_*` wildcard. Run when the stored settings were
/// written by an older version; persist the result if [`PruneStats::changed`].
pub fn prune_user_rules(defaults: &[String], user: &mut Vec<String>) -> PruneStats {
    let before = user.len();

    for default in defaults {
        if default.ends_with("_*") {
            let prefix = &default[..default.len() - 1];
            user.retain(|rule| {
                let keep = !rule.starts_with(prefix);
                if !keep {
                    debug!("user rule '{}' covered by default '{}'", rule, default);
                }
                keep
            });
        }
        user.retain(|rule| rule != default);
    }

    PruneStats {
        before,
        after: user.len(),
    }
}
