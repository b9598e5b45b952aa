//! Session question selection.
//!
//! Picks a five-question session from the catalog: a weighted category mix,
//! bias-level round robin inside the real-data portion, a cap on featured
//! "obvious answer" questions, and per-day exclusions that fall back to the
//! full subset when they would starve a category.

use rand::Rng;
use rand::seq::SliceRandom;
use std::collections::HashSet;

use crate::model::{BiasLevel, Category, Question, QuestionId};

/// Number of questions in one session.
pub const SESSION_SIZE: usize = 5;

/// Attempts to replace an over-cap pick before deferring it.
pub const MAX_CAP_RETRIES: usize = 3;

/// Maximum number of featured `Top` questions per session.
pub const FEATURED_TOP_CAP: usize = 1;

//
// ─── COMPOSITION ───────────────────────────────────────────────────────────────
//

/// Per-category question counts for one session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Composition {
    pub real: usize,
    pub theory: usize,
    pub knowledge: usize,
}

impl Composition {
    pub const DATA_ONLY: Composition = Composition::new(SESSION_SIZE, 0, 0);

    #[must_use]
    pub const fn new(real: usize, theory: usize, knowledge: usize) -> Self {
        Self {
            real,
            theory,
            knowledge,
        }
    }

    #[must_use]
    pub fn total(&self) -> usize {
        self.real + self.theory + self.knowledge
    }

    #[must_use]
    pub fn quota(&self, category: Category) -> usize {
        match category {
            Category::RealData => self.real,
            Category::Theory => self.theory,
            Category::Knowledge => self.knowledge,
        }
    }

    /// True for every row of [`COMPOSITION_MENU`].
    #[must_use]
    pub fn is_valid_mix(&self) -> bool {
        self.total() == SESSION_SIZE && self.real >= 2 && self.knowledge <= 1
    }
}

/// Valid mixed compositions and their relative weights.
pub const COMPOSITION_MENU: [(Composition, u32); 6] = [
    (Composition::new(5, 0, 0), 30),
    (Composition::new(4, 1, 0), 25),
    (Composition::new(4, 0, 1), 15),
    (Composition::new(3, 2, 0), 15),
    (Composition::new(3, 1, 1), 10),
    (Composition::new(2, 2, 1), 5),
];

/// Draw a composition from the weighted menu.
pub fn pick_composition<R: Rng + ?Sized>(rng: &mut R) -> Composition {
    pick_weighted(&COMPOSITION_MENU, rng)
}

/// Weighted draw over `rows`; weights are relative to the rows given.
fn pick_weighted<R: Rng + ?Sized>(rows: &[(Composition, u32)], rng: &mut R) -> Composition {
    let total: u32 = rows.iter().map(|(_, w)| w).sum();
    if total == 0 {
        return COMPOSITION_MENU[0].0;
    }
    let mut roll = rng.random_range(0..total);
    for &(composition, weight) in rows {
        if roll < weight {
            return composition;
        }
        roll -= weight;
    }
    COMPOSITION_MENU[0].0
}

/// Menu rows whose every quota the pool can fill, after exclusions or their fallback.
fn feasible_rows(pool: &[Question], excluded: &HashSet<QuestionId>) -> Vec<(Composition, u32)> {
    COMPOSITION_MENU
        .into_iter()
        .filter(|(composition, _)| {
            Category::ALL.into_iter().all(|category| {
                let quota = composition.quota(category);
                if quota == 0 {
                    return true;
                }
                let (found, _) = candidates(pool, category, excluded, quota);
                distinct_count(&found) >= quota
            })
        })
        .collect()
}

fn distinct_count(questions: &[&Question]) -> usize {
    questions.iter().map(|q| q.id()).collect::<HashSet<_>>().len()
}

//
// ─── OPTIONS / RESULT ──────────────────────────────────────────────────────────
//

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectionOptions {
    /// Draw all five questions from `RealData`.
    pub data_only: bool,
    /// Identifiers already shown to the player today.
    pub excluded: HashSet<QuestionId>,
}

impl SelectionOptions {
    #[must_use]
    pub fn data_only() -> Self {
        Self {
            data_only: true,
            excluded: HashSet::new(),
        }
    }

    #[must_use]
    pub fn with_excluded(mut self, excluded: impl IntoIterator<Item = QuestionId>) -> Self {
        self.excluded.extend(excluded);
        self
    }
}

/// Result of one session selection.
///
/// `questions` may be shorter than the composition when the catalog does not
/// hold enough questions; callers treat that as insufficient content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection {
    pub questions: Vec<Question>,
    pub composition: Composition,
    /// At least one category ignored the exclusion set.
    pub used_fallback: bool,
}

impl Selection {
    #[must_use]
    pub fn is_short(&self) -> bool {
        self.questions.len() < self.composition.total()
    }
}

//
// ─── SELECTION ─────────────────────────────────────────────────────────────────
//

/// Select a session using the thread-local RNG.
#[must_use]
pub fn select_session_random(pool: &[Question], options: &SelectionOptions) -> Selection {
    select_session(pool, options, &mut rand::rng())
}

/// Select up to [`SESSION_SIZE`] questions for one session.
///
/// Mixed sessions draw only from menu rows the pool can fill, with the
/// weights renormalized over those rows. Never fails: when no row fits, the
/// full menu is used and the selection comes back short.
pub fn select_session<R: Rng + ?Sized>(
    pool: &[Question],
    options: &SelectionOptions,
    rng: &mut R,
) -> Selection {
    let composition = if options.data_only {
        Composition::DATA_ONLY
    } else {
        let rows = feasible_rows(pool, &options.excluded);
        if rows.is_empty() {
            pick_composition(rng)
        } else {
            pick_weighted(&rows, rng)
        }
    };

    let mut used_fallback = false;
    let mut chosen: HashSet<QuestionId> = HashSet::new();
    let mut picked: Vec<Question> = Vec::with_capacity(composition.total());

    for category in Category::ALL {
        let quota = composition.quota(category);
        if quota == 0 {
            continue;
        }
        let (candidates, fell_back) = candidates(pool, category, &options.excluded, quota);
        used_fallback |= fell_back;

        let drawn = if category == Category::RealData {
            draw_balanced(candidates, quota, &mut chosen, rng)
        } else {
            draw_uniform(candidates, quota, &mut chosen, rng)
        };
        picked.extend(drawn.into_iter().cloned());
    }

    picked.shuffle(rng);

    Selection {
        questions: picked,
        composition,
        used_fallback,
    }
}

/// Category subset minus exclusions.
///
/// Falls back to the unfiltered subset only when exclusions were supplied,
/// removed at least one question, and left fewer than `quota` candidates.
fn candidates<'a>(
    pool: &'a [Question],
    category: Category,
    excluded: &HashSet<QuestionId>,
    quota: usize,
) -> (Vec<&'a Question>, bool) {
    let subset: Vec<&Question> = pool.iter().filter(|q| q.category() == category).collect();
    if excluded.is_empty() {
        return (subset, false);
    }

    let filtered: Vec<&Question> = subset
        .iter()
        .copied()
        .filter(|q| !excluded.contains(q.id()))
        .collect();
    let binding = filtered.len() < subset.len();
    if binding && filtered.len() < quota {
        (subset, true)
    } else {
        (filtered, false)
    }
}

fn draw_uniform<'a, R: Rng + ?Sized>(
    mut candidates: Vec<&'a Question>,
    quota: usize,
    chosen: &mut HashSet<QuestionId>,
    rng: &mut R,
) -> Vec<&'a Question> {
    candidates.shuffle(rng);
    let mut out = Vec::with_capacity(quota);
    for q in candidates {
        if out.len() == quota {
            break;
        }
        if chosen.insert(q.id().clone()) {
            out.push(q);
        }
    }
    out
}

/// Round robin over `Top, Mid, Avg, Low` with the featured-entity cap.
fn draw_balanced<'a, R: Rng + ?Sized>(
    candidates: Vec<&'a Question>,
    quota: usize,
    chosen: &mut HashSet<QuestionId>,
    rng: &mut R,
) -> Vec<&'a Question> {
    let mut groups: [Vec<&Question>; 4] = Default::default();
    for q in candidates {
        groups[q.bias().index()].push(q);
    }
    for group in &mut groups {
        group.shuffle(rng);
    }

    let mut out = Vec::with_capacity(quota);
    let mut featured_top = 0_usize;
    // Over-cap picks; used only once every group has run dry.
    let mut deferred: Vec<&Question> = Vec::new();

    while out.len() < quota && groups.iter().any(|g| !g.is_empty()) {
        for level in BiasLevel::ALL {
            if out.len() == quota {
                break;
            }
            let Some(q) = groups[level.index()].pop() else {
                continue;
            };
            if chosen.contains(q.id()) {
                continue;
            }

            if q.is_capped_pick() && featured_top >= FEATURED_TOP_CAP {
                if let Some(alt) = draw_alternative(&mut groups, chosen, rng) {
                    chosen.insert(alt.id().clone());
                    out.push(alt);
                }
                deferred.push(q);
                continue;
            }

            if q.is_capped_pick() {
                featured_top += 1;
            }
            chosen.insert(q.id().clone());
            out.push(q);
        }
    }

    for q in deferred {
        if out.len() == quota {
            break;
        }
        if chosen.insert(q.id().clone()) {
            out.push(q);
        }
    }

    out
}

/// Random pick from the pooled `Mid/Avg/Low` groups, bounded by [`MAX_CAP_RETRIES`].
fn draw_alternative<'a, R: Rng + ?Sized>(
    groups: &mut [Vec<&'a Question>; 4],
    chosen: &HashSet<QuestionId>,
    rng: &mut R,
) -> Option<&'a Question> {
    for _ in 0..MAX_CAP_RETRIES {
        let pooled: usize = groups[1..].iter().map(Vec::len).sum();
        if pooled == 0 {
            return None;
        }
        let mut slot = rng.random_range(0..pooled);
        for group in &mut groups[1..] {
            if slot < group.len() {
                let q = group.swap_remove(slot);
                if !chosen.contains(q.id()) {
                    return Some(q);
                }
                break;
            }
            slot -= group.len();
        }
    }
    None
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
