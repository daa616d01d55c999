//! Wizard engine.
//!
//! A wizard is a closed step enum plus a transition table. Handlers compute
//! the event an input represents, then ask the table for the next step
//! before touching the session or the catalog; a pair with no entry is an
//! `IllegalTransition`.

pub mod add;
pub mod edit;
pub mod images;
pub mod validate;

pub use add::{AddEvent, AddWizard};
pub use edit::{EditEvent, EditWizard};
pub use images::ImageCollectorExt;

use std::fmt::Debug;

use showroom_types::error::IllegalTransition;

/// A finite wizard: its steps, the events that move between them, and
/// the table that says which moves exist.
pub trait Wizard {
    type Step: Copy + Debug + PartialEq;
    type Event: Debug;

    /// Next step for `(step, event)`, or `None` when the pair is not in the
    /// table.
    fn next(step: Self::Step, event: &Self::Event) -> Option<Self::Step>;

    /// Steps that end the flow. A terminal step is never stored.
    fn is_terminal(step: Self::Step) -> bool;
}

/// Look up a transition, rejecting pairs the table does not list.
pub fn advance<W: Wizard>(step: W::Step, event: &W::Event) -> Result<W::Step, IllegalTransition> {
    if W::is_terminal(step) {
        return Err(illegal(step, event));
    }
    W::next(step, event).ok_or_else(|| illegal(step, event))
}

fn illegal(step: impl Debug, event: impl Debug) -> IllegalTransition {
    IllegalTransition {
        step: format!("{step:?}"),
        event: format!("{event:?}"),
    }
}
