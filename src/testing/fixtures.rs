//! Sample state documents for consistent testing.

/// A fully populated state document.
pub const FULL_STATE: &str = r#"---
iteration: 12
max_iterations: 30
mode: review
scope: src/payments and related tests
task_started_at: 1
issues_found: 5
issues_fixed: 3
---

# Loop State

## Current Focus
Harden refund flow against double submission.
Keep changes inside the payments crate.

## Backlog
- [ ] Validate currency codes
- [x] Already handled elsewhere
- [ ] Add idempotency keys to refunds

## Completed
- [x] Fix rounding in tax calculation
- [x] Remove dead webhook handler

## Notes
Reviewer asked for smaller commits.
"#;

/// Iteration 3, two open backlog items, one closed item, no focus section.
pub const SCENARIO_STATE: &str = r#"iteration: 3

## Backlog
- [ ] Write parser tests
- [ ] Handle CRLF

## Completed
- [x] Set up project
"#;
