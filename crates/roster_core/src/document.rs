//! Retained page model: activity list, select options, signup form, and the
//! click bindings of the removal controls.

use std::collections::BTreeMap;

use shared::domain::ParticipantRef;

use crate::encoding::{decode_participant_ref, encode_participant_ref, ReferenceError};

pub const SELECT_PLACEHOLDER: &str = "-- Select an activity --";
pub const NO_PARTICIPANTS_NOTICE: &str = "No participants yet";
pub const LOADING_NOTICE: &str = "Loading activities...";
pub const LOAD_FAILURE_NOTICE: &str = "Failed to load activities. Please try again later.";

pub type ControlId = u64;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoveControl {
    pub id: ControlId,
    /// Encoded `ParticipantRef`, read back when the control is clicked.
    pub data: String,
    pub busy: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParticipantRow {
    pub email: String,
    pub control: RemoveControl,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParticipantsSection {
    Empty,
    Rows(Vec<ParticipantRow>),
}

impl ParticipantsSection {
    pub fn rows(&self) -> &[ParticipantRow] {
        match self {
            Self::Empty => &[],
            Self::Rows(rows) => rows.as_slice(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActivityCard {
    pub name: String,
    pub description: String,
    pub schedule: String,
    pub spots_left: i64,
    pub participants: ParticipantsSection,
}

impl ActivityCard {
    pub fn availability(&self) -> String {
        format!("{} spots left", self.spots_left)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectOption {
    pub value: String,
    pub label: String,
}

impl SelectOption {
    pub fn placeholder() -> Self {
        Self {
            value: String::new(),
            label: SELECT_PLACEHOLDER.to_string(),
        }
    }

    pub fn activity(name: &str) -> Self {
        Self {
            value: name.to_string(),
            label: name.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListArea {
    Notice(String),
    Cards(Vec<ActivityCard>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClickAction {
    Unregister,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SignupForm {
    pub email: String,
    pub activity: String,
    pub busy: bool,
    /// Bumped by every `reset`, so a viewer that skipped intermediate
    /// snapshots can still tell the form was cleared.
    pub resets: u64,
}

impl SignupForm {
    pub fn reset(&mut self) {
        self.email.clear();
        self.activity.clear();
        self.resets += 1;
    }
}

/// Everything the renderer produces for one snapshot, installed in one step.
#[derive(Debug, Clone)]
pub struct RenderedRoster {
    pub cards: Vec<ActivityCard>,
    pub options: Vec<SelectOption>,
    pub bindings: BTreeMap<ControlId, ClickAction>,
    pub next_control_id: ControlId,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    list: ListArea,
    options: Vec<SelectOption>,
    form: SignupForm,
    handlers: BTreeMap<ControlId, ClickAction>,
    next_control_id: ControlId,
}

impl Default for Document {
    fn default() -> Self {
        Self {
            list: ListArea::Notice(LOADING_NOTICE.to_string()),
            options: vec![SelectOption::placeholder()],
            form: SignupForm::default(),
            handlers: BTreeMap::new(),
            next_control_id: 1,
        }
    }
}

impl Document {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn list(&self) -> &ListArea {
        &self.list
    }

    pub fn cards(&self) -> &[ActivityCard] {
        match &self.list {
            ListArea::Cards(cards) => cards.as_slice(),
            ListArea::Notice(_) => &[],
        }
    }

    pub fn notice(&self) -> Option<&str> {
        match &self.list {
            ListArea::Notice(text) => Some(text),
            ListArea::Cards(_) => None,
        }
    }

    pub fn has_roster(&self) -> bool {
        matches!(self.list, ListArea::Cards(_))
    }

    pub fn options(&self) -> &[SelectOption] {
        &self.options
    }

    pub fn form(&self) -> &SignupForm {
        &self.form
    }

    pub fn form_mut(&mut self) -> &mut SignupForm {
        &mut self.form
    }

    pub fn next_control_id(&self) -> ControlId {
        self.next_control_id
    }

    /// Replaces the list subtree, the select options and every binding at once.
    /// Bindings of the previous subtree go away with it.
    pub fn install(&mut self, rendered: RenderedRoster) {
        self.list = ListArea::Cards(rendered.cards);
        self.options = rendered.options;
        self.handlers = rendered.bindings;
        self.next_control_id = rendered.next_control_id;
    }

    pub fn show_notice(&mut self, text: impl Into<String>) {
        self.list = ListArea::Notice(text.into());
        self.options = vec![SelectOption::placeholder()];
        self.handlers.clear();
    }

    pub fn handler_count(&self) -> usize {
        self.handlers.len()
    }

    pub fn handler(&self, control: ControlId) -> Option<ClickAction> {
        self.handlers.get(&control).copied()
    }

    pub fn control(&self, control: ControlId) -> Option<&RemoveControl> {
        self.cards()
            .iter()
            .flat_map(|card| card.participants.rows())
            .map(|row| &row.control)
            .find(|candidate| candidate.id == control)
    }

    pub fn controls(&self) -> impl Iterator<Item = &RemoveControl> {
        self.cards()
            .iter()
            .flat_map(|card| card.participants.rows())
            .map(|row| &row.control)
    }

    /// Dispatches a click on a removal control. `None` when nothing is bound,
    /// which includes controls from an earlier render.
    pub fn click(
        &self,
        control: ControlId,
    ) -> Option<Result<(ClickAction, ParticipantRef), ReferenceError>> {
        let action = self.handler(control)?;
        let target = self.control(control)?;
        Some(decode_participant_ref(&target.data).map(|participant| (action, participant)))
    }

    pub fn set_participant_busy(&mut self, participant: &ParticipantRef, busy: bool) {
        let data = encode_participant_ref(participant);
        if let ListArea::Cards(cards) = &mut self.list {
            for card in cards {
                if let ParticipantsSection::Rows(rows) = &mut card.participants {
                    for row in rows.iter_mut().filter(|row| row.control.data == data) {
                        row.control.busy = busy;
                    }
                }
            }
        }
    }
}
