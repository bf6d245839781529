// movement/mapper.rs — per-destination field remapping.
//
// Pure: no store access, no clock access beyond the `now` argument. Every
// text field in the produced payload is a concrete string; unavailable
// source fields become empty strings.

use chrono::{DateTime, Duration, Utc};

use crate::storage::{NewFollowup, NewInteraction, NewProspect, NewRoutedContact};

use super::{
    is_valid_bucket, MoveError, StoreKind, FOLLOWUP_CHANNELS, INTERACTION_CHANNELS,
};

/// Snapshot of a source record, reduced to the fields any destination can
/// draw from. Loaded by the store before mapping.
#[derive(Debug, Clone)]
pub struct MoveSource {
    pub kind: StoreKind,
    pub id: String,
    pub name: String,
    pub company: String,
    pub email: String,
    pub phone: String,
    /// Prospect the source refers to. A prospect source refers to itself;
    /// a routed contact may carry none.
    pub prospect_id: Option<String>,
    /// Free-text context: sector for prospects, subject for interactions,
    /// title for followups, bucket for routed contacts.
    pub context: String,
}

/// A creation payload shaped for one of the four destination stores.
#[derive(Debug, Clone)]
pub enum DestinationPayload {
    Prospect(NewProspect),
    Interaction(NewInteraction),
    Followup(NewFollowup),
    RoutedContact(NewRoutedContact),
}

/// Build the destination payload for moving `source` into `destination`.
///
/// Validation happens here, before any store mutation: a destination that
/// requires a sub-type (interactions need a channel, routed contacts need a
/// bucket) rejects with [`MoveError::MissingType`] when none is supplied,
/// and with [`MoveError::InvalidType`] when the supplied one is not in the
/// destination's allow-list. Moving a record onto its own kind rejects with
/// [`MoveError::InvalidDestination`].
pub fn build_payload(
    source: &MoveSource,
    destination: StoreKind,
    sub_type: Option<&str>,
    note: Option<&str>,
    now: DateTime<Utc>,
) -> Result<DestinationPayload, MoveError> {
    if destination == source.kind {
        return Err(MoveError::InvalidDestination);
    }

    let origin = source.kind.as_str();
    let note = note.map(str::trim).filter(|n| !n.is_empty());

    match destination {
        StoreKind::Prospect => {
            let status = match source.kind {
                StoreKind::RoutedContact => "NEW",
                StoreKind::Interaction | StoreKind::Followup => "CONTACTED",
                StoreKind::Prospect => unreachable!("same-kind move rejected above"),
            };
            let notes = note.map(str::to_string).unwrap_or_else(|| {
                format!("Moved from {} on {}", origin, now.format("%Y-%m-%d"))
            });
            Ok(DestinationPayload::Prospect(NewProspect {
                name: source.name.clone(),
                company: source.company.clone(),
                email: source.email.clone(),
                phone: source.phone.clone(),
                source_channel: origin.to_string(),
                status: status.to_string(),
                priority: "MEDIUM".to_string(),
                notes,
                ..NewProspect::default()
            }))
        }
        StoreKind::Interaction => {
            let channel = match sub_type {
                None => return Err(MoveError::MissingType),
                Some(t) if !INTERACTION_CHANNELS.contains(&t) => {
                    return Err(MoveError::InvalidType(t.to_string()))
                }
                Some(t) => t,
            };
            let body = note.map(str::to_string).unwrap_or_else(|| {
                format!("Routed from {} - {}", origin, source.context)
            });
            Ok(DestinationPayload::Interaction(NewInteraction {
                prospect_id: source.prospect_id.clone().unwrap_or_default(),
                channel: channel.to_string(),
                subject: format!("Contact from {}: {}", origin, source.company),
                body,
                duration: None,
                outcome: None,
                occurred_at: Some(now.to_rfc3339()),
            }))
        }
        StoreKind::Followup => {
            let channel = match sub_type {
                None => "CALL",
                Some(t) if !FOLLOWUP_CHANNELS.contains(&t) => {
                    return Err(MoveError::InvalidType(t.to_string()))
                }
                Some(t) => t,
            };
            let description = note.map(str::to_string).unwrap_or_else(|| {
                format!("Follow-up from {} for {}", origin, source.company)
            });
            Ok(DestinationPayload::Followup(NewFollowup {
                prospect_id: source.prospect_id.clone().unwrap_or_default(),
                channel: channel.to_string(),
                title: format!("Follow-up: {}", source.name),
                description,
                scheduled_at: (now + Duration::hours(24)).to_rfc3339(),
                priority: "MEDIUM".to_string(),
            }))
        }
        StoreKind::RoutedContact => {
            let bucket = match sub_type {
                None => return Err(MoveError::MissingType),
                Some(b) if !is_valid_bucket(b) => {
                    return Err(MoveError::InvalidType(b.to_string()))
                }
                Some(b) => b,
            };
            Ok(DestinationPayload::RoutedContact(NewRoutedContact {
                name: source.name.clone(),
                company: source.company.clone(),
                email: source.email.clone(),
                phone: source.phone.clone(),
                origin: origin.to_string(),
                bucket: bucket.to_string(),
                notes: note.map(str::to_string).unwrap_or_default(),
                prospect_id: source.prospect_id.clone(),
            }))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn routed_source() -> MoveSource {
        MoveSource {
            kind: StoreKind::RoutedContact,
            id: "rc-1".to_string(),
            name: "Laura Medina".to_string(),
            company: "Clinica Norte".to_string(),
            email: "laura@clinicanorte.es".to_string(),
            phone: "+34 600 111 222".to_string(),
            prospect_id: None,
            context: "clinics".to_string(),
        }
    }

    fn now() -> DateTime<Utc> {
        "2024-03-15T10:00:00+00:00".parse().unwrap()
    }

    #[test]
    fn routed_contact_to_prospect_gets_new_status_and_auto_note() {
        let payload = build_payload(&routed_source(), StoreKind::Prospect, None, None, now())
            .expect("mapping should succeed");
        let DestinationPayload::Prospect(p) = payload else {
            panic!("expected prospect payload");
        };
        assert_eq!(p.status, "NEW");
        assert_eq!(p.priority, "MEDIUM");
        assert_eq!(p.source_channel, "routed-contacts");
        assert_eq!(p.notes, "Moved from routed-contacts on 2024-03-15");
        assert_eq!(p.name, "Laura Medina");
        // Fields the source cannot provide are empty, never missing.
        assert_eq!(p.city, "");
        assert_eq!(p.title, "");
    }

    #[test]
    fn interaction_source_to_prospect_gets_contacted_status() {
        let source = MoveSource {
            kind: StoreKind::Interaction,
            id: "i-1".to_string(),
            name: "Pedro Ruiz".to_string(),
            company: String::new(),
            email: String::new(),
            phone: String::new(),
            prospect_id: Some("p-9".to_string()),
            context: "Intro call".to_string(),
        };
        let payload =
            build_payload(&source, StoreKind::Prospect, None, Some("warm lead"), now()).unwrap();
        let DestinationPayload::Prospect(p) = payload else {
            panic!("expected prospect payload");
        };
        assert_eq!(p.status, "CONTACTED");
        assert_eq!(p.notes, "warm lead");
    }

    #[test]
    fn interaction_destination_requires_a_channel() {
        let err = build_payload(&routed_source(), StoreKind::Interaction, None, None, now())
            .unwrap_err();
        assert!(matches!(err, MoveError::MissingType));

        let err = build_payload(
            &routed_source(),
            StoreKind::Interaction,
            Some("FAX"),
            None,
            now(),
        )
        .unwrap_err();
        assert!(matches!(err, MoveError::InvalidType(_)));
    }

    #[test]
    fn followup_defaults_channel_and_schedules_next_day() {
        let mut source = routed_source();
        source.prospect_id = Some("p-1".to_string());
        let payload = build_payload(&source, StoreKind::Followup, None, None, now()).unwrap();
        let DestinationPayload::Followup(f) = payload else {
            panic!("expected followup payload");
        };
        assert_eq!(f.channel, "CALL");
        assert_eq!(f.title, "Follow-up: Laura Medina");
        assert_eq!(f.scheduled_at, "2024-03-16T10:00:00+00:00");
        assert_eq!(f.priority, "MEDIUM");
    }

    #[test]
    fn routed_contact_destination_requires_a_valid_bucket() {
        let source = MoveSource {
            kind: StoreKind::Prospect,
            id: "p-1".to_string(),
            name: "Acme".to_string(),
            company: "Acme Corp".to_string(),
            email: String::new(),
            phone: String::new(),
            prospect_id: Some("p-1".to_string()),
            context: String::new(),
        };
        let err =
            build_payload(&source, StoreKind::RoutedContact, None, None, now()).unwrap_err();
        assert!(matches!(err, MoveError::MissingType));

        let err = build_payload(&source, StoreKind::RoutedContact, Some("retail"), None, now())
            .unwrap_err();
        assert!(matches!(err, MoveError::InvalidType(_)));

        let ok = build_payload(&source, StoreKind::RoutedContact, Some("other"), None, now());
        assert!(ok.is_ok());
    }

    #[test]
    fn same_kind_move_is_rejected() {
        let err = build_payload(&routed_source(), StoreKind::RoutedContact, Some("other"), None, now())
            .unwrap_err();
        assert!(matches!(err, MoveError::InvalidDestination));
    }

    #[test]
    fn blank_note_falls_back_to_derived_text() {
        let payload =
            build_payload(&routed_source(), StoreKind::Prospect, None, Some("   "), now()).unwrap();
        let DestinationPayload::Prospect(p) = payload else {
            panic!("expected prospect payload");
        };
        assert_eq!(p.notes, "Moved from routed-contacts on 2024-03-15");
    }

    proptest! {
        // Prospect -> routed contact -> prospect keeps the identifying fields
        // intact and non-null, whatever the optional fields hold.
        #[test]
        fn prospect_round_trip_keeps_required_fields(
            name in "[a-zA-Z][a-zA-Z ]{0,30}",
            company in "[a-zA-Z ]{0,30}",
            email in "[a-z]{0,10}",
            phone in "[0-9]{0,12}",
        ) {
            let source = MoveSource {
                kind: StoreKind::Prospect,
                id: "p-1".to_string(),
                name: name.clone(),
                company: company.clone(),
                email,
                phone,
                prospect_id: Some("p-1".to_string()),
                context: String::new(),
            };
            let parked = build_payload(&source, StoreKind::RoutedContact, Some("other"), None, now())
                .unwrap();
            let DestinationPayload::RoutedContact(rc) = parked else {
                panic!("expected routed contact payload");
            };

            let back_source = MoveSource {
                kind: StoreKind::RoutedContact,
                id: "rc-1".to_string(),
                name: rc.name,
                company: rc.company,
                email: rc.email,
                phone: rc.phone,
                prospect_id: rc.prospect_id,
                context: rc.bucket,
            };
            let revived = build_payload(&back_source, StoreKind::Prospect, None, None, now())
                .unwrap();
            let DestinationPayload::Prospect(p) = revived else {
                panic!("expected prospect payload");
            };
            prop_assert_eq!(p.name, name);
            prop_assert_eq!(p.company, company);
            prop_assert!(!p.status.is_empty());
            prop_assert!(!p.notes.is_empty());
        }
    }
}
