//! Agree/disagree reactions on community posts.
//!
//! A user holds at most one reaction per post. The original app mutated the
//! two membership arrays directly inside a database transaction; the
//! transition is extracted here so it can be tested without a live database.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReactionKind {
    Agree,
    Disagree,
}

/// Membership of both reaction sets for a single post.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ReactionSet {
    pub agree: HashSet<Uuid>,
    pub disagree: HashSet<Uuid>,
}

impl ReactionSet {
    pub fn from_arrays(agree: Vec<Uuid>, disagree: Vec<Uuid>) -> Self {
        Self {
            agree: agree.into_iter().collect(),
            disagree: disagree.into_iter().collect(),
        }
    }

    /// The caller's current reaction, if any. If a row somehow holds the
    /// user in both sets, agree wins for display; `toggle` repairs the row
    /// on the next write.
    pub fn reaction_of(&self, user_id: Uuid) -> Option<ReactionKind> {
        if self.agree.contains(&user_id) {
            Some(ReactionKind::Agree)
        } else if self.disagree.contains(&user_id) {
            Some(ReactionKind::Disagree)
        } else {
            None
        }
    }
}

/// Apply one agree/disagree click.
///
/// Clicking the reaction the user already holds retracts it; clicking the
/// other one switches sides in a single step. A degenerate row with the user
/// in both sets comes out holding only the target reaction.
pub fn toggle(prior: &ReactionSet, user_id: Uuid, kind: ReactionKind) -> ReactionSet {
    let mut next = prior.clone();

    let (target, opposite) = match kind {
        ReactionKind::Agree => (&mut next.agree, &mut next.disagree),
        ReactionKind::Disagree => (&mut next.disagree, &mut next.agree),
    };

    let was_opposite = opposite.remove(&user_id);
    if target.contains(&user_id) && !was_opposite {
        target.remove(&user_id);
    } else {
        target.insert(user_id);
    }

    next
}

#[cfg(test)]
mod tests {
    use super::*;

    fn uid(n: u128) -> Uuid {
        Uuid::from_u128(n)
    }

    #[test]
    fn first_click_adds_reaction() {
        let set = ReactionSet::default();
        let next = toggle(&set, uid(1), ReactionKind::Agree);
        assert!(next.agree.contains(&uid(1)));
        assert!(next.disagree.is_empty());
    }

    #[test]
    fn second_identical_click_retracts() {
        let set = ReactionSet::default();
        let once = toggle(&set, uid(1), ReactionKind::Agree);
        let twice = toggle(&once, uid(1), ReactionKind::Agree);
        assert!(!twice.agree.contains(&uid(1)));
        assert!(!twice.disagree.contains(&uid(1)));
    }

    #[test]
    fn opposite_click_switches_sides() {
        let set = ReactionSet::from_arrays(vec![uid(1)], vec![]);
        let next = toggle(&set, uid(1), ReactionKind::Disagree);
        assert!(!next.agree.contains(&uid(1)));
        assert!(next.disagree.contains(&uid(1)));
    }

    #[test]
    fn other_users_are_untouched() {
        let set = ReactionSet::from_arrays(vec![uid(1), uid(2)], vec![uid(3)]);
        let next = toggle(&set, uid(1), ReactionKind::Disagree);
        assert!(next.agree.contains(&uid(2)));
        assert!(next.disagree.contains(&uid(3)));
        assert!(next.disagree.contains(&uid(1)));
    }

    #[test]
    fn degenerate_both_sets_heals_to_target_only() {
        let set = ReactionSet::from_arrays(vec![uid(1)], vec![uid(1)]);
        let next = toggle(&set, uid(1), ReactionKind::Agree);
        assert!(next.agree.contains(&uid(1)));
        assert!(!next.disagree.contains(&uid(1)));
    }

    #[test]
    fn mutual_exclusion_holds_under_any_click_sequence() {
        let mut set = ReactionSet::default();
        let clicks = [
            (1, ReactionKind::Agree),
            (2, ReactionKind::Disagree),
            (1, ReactionKind::Disagree),
            (1, ReactionKind::Disagree),
            (2, ReactionKind::Agree),
            (1, ReactionKind::Agree),
            (2, ReactionKind::Agree),
        ];
        for (n, kind) in clicks {
            set = toggle(&set, uid(n), kind);
            assert!(
                set.agree.is_disjoint(&set.disagree),
                "user in both sets after clicking {:?}",
                kind
            );
        }
        assert_eq!(set.reaction_of(uid(1)), Some(ReactionKind::Agree));
        assert_eq!(set.reaction_of(uid(2)), None);
    }

    #[test]
    fn reaction_of_reports_membership() {
        let set = ReactionSet::from_arrays(vec![uid(1)], vec![uid(2)]);
        assert_eq!(set.reaction_of(uid(1)), Some(ReactionKind::Agree));
        assert_eq!(set.reaction_of(uid(2)), Some(ReactionKind::Disagree));
        assert_eq!(set.reaction_of(uid(3)), None);
    }
}
