use std::collections::{BTreeMap, HashSet};

use shared::domain::{ActivityCollection, ParticipantRef};

use crate::{
    document::{
        ActivityCard, ClickAction, Document, ParticipantRow, ParticipantsSection, RemoveControl,
        RenderedRoster, SelectOption,
    },
    encoding::encode_participant_ref,
};

/// Builds the full list subtree and select options for `activities` and swaps
/// them into `document`. Participants in `busy` get their control disabled.
pub fn render_roster(
    document: &mut Document,
    activities: &ActivityCollection,
    busy: &HashSet<ParticipantRef>,
) {
    let rendered = build_roster(document.next_control_id(), activities, busy);
    document.install(rendered);
}

pub fn build_roster(
    first_control_id: u64,
    activities: &ActivityCollection,
    busy: &HashSet<ParticipantRef>,
) -> RenderedRoster {
    let mut next_control_id = first_control_id;
    let mut bindings = BTreeMap::new();
    let mut options = Vec::with_capacity(activities.len() + 1);
    options.push(SelectOption::placeholder());

    let cards = activities
        .iter()
        .map(|(name, activity)| {
            options.push(SelectOption::activity(name));

            let participants = if activity.participants.is_empty() {
                ParticipantsSection::Empty
            } else {
                let rows = activity
                    .participants
                    .iter()
                    .map(|email| {
                        let participant = ParticipantRef::new(name, email.as_str());
                        let control = RemoveControl {
                            id: next_control_id,
                            data: encode_participant_ref(&participant),
                            busy: busy.contains(&participant),
                        };
                        bindings.insert(control.id, ClickAction::Unregister);
                        next_control_id += 1;
                        ParticipantRow {
                            email: email.clone(),
                            control,
                        }
                    })
                    .collect();
                ParticipantsSection::Rows(rows)
            };

            ActivityCard {
                name: name.to_string(),
                description: activity.description.clone(),
                schedule: activity.schedule.clone(),
                spots_left: activity.spots_left(),
                participants,
            }
        })
        .collect();

    RenderedRoster {
        cards,
        options,
        bindings,
        next_control_id,
    }
}
