//! Test-only fixture records, warm helpers, and a recording broadcaster.
//!
//! The cars and albums shapes mirror the engine's seed scenarios and are
//! shared by the engine, paginator, and property tests.

use crate::{
    direction::Direction,
    engine::{Engine, EntityData, OrderHint, WarmEntry},
    model::{EntityModel, FieldModel, IdKey, PrefilterModel},
    pubsub::{Broadcaster, ViewEvent},
    traits::Record,
    value::Value,
};
use chrono::{DateTime, Utc};
use std::sync::Mutex;

///
/// Car
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub(crate) struct Car {
    pub(crate) id: u64,
    pub(crate) make: String,
}

impl Record for Car {
    fn field(&self, name: &str) -> Option<Value> {
        match name {
            "id" => Some(Value::Uint(self.id)),
            "make" => Some(Value::text(self.make.clone())),
            _ => None,
        }
    }
}

pub(crate) fn car(id: u64, make: &str) -> Car {
    Car {
        id,
        make: make.to_string(),
    }
}

pub(crate) fn car_model() -> EntityModel<Car> {
    EntityModel::new("cars", IdKey::Field("id".into()))
        .with_field(FieldModel::natural("make"))
        .with_prefilter(PrefilterModel::global(vec!["make".into()]))
}

/// Cars warmed ascending by make, with the matching hint.
pub(crate) fn warm_cars(cars: Vec<Car>) -> Engine<Car> {
    Engine::warm(vec![WarmEntry::new(
        car_model(),
        EntityData::new(cars).with_hint(OrderHint::new("make", Direction::Asc)),
    )])
    .expect("car warm should succeed")
}

///
/// Album
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub(crate) struct Album {
    pub(crate) id: u64,
    pub(crate) name: String,
    pub(crate) label: String,
    pub(crate) media: String,
    pub(crate) artist: String,
    pub(crate) inserted_at: DateTime<Utc>,
}

impl Record for Album {
    fn field(&self, name: &str) -> Option<Value> {
        match name {
            "id" => Some(Value::Uint(self.id)),
            "name" => Some(Value::text(self.name.clone())),
            "label" => Some(Value::text(self.label.clone())),
            "media" => Some(Value::text(self.media.clone())),
            "artist" => Some(Value::text(self.artist.clone())),
            "inserted_at" => Some(Value::Timestamp(self.inserted_at)),
            _ => None,
        }
    }
}

pub(crate) fn album(id: u64, name: &str, label: &str, media: &str, artist: &str, at: &str) -> Album {
    Album {
        id,
        name: name.to_string(),
        label: label.to_string(),
        media: media.to_string(),
        artist: artist.to_string(),
        inserted_at: DateTime::parse_from_rfc3339(at)
            .expect("fixture timestamp")
            .with_timezone(&Utc),
    }
}

pub(crate) fn album_model() -> EntityModel<Album> {
    EntityModel::new("albums", IdKey::Field("id".into()))
        .with_field(FieldModel::natural("name"))
        .with_field(FieldModel::datetime("inserted_at"))
        .with_prefilter(PrefilterModel::global(vec!["media".into()]))
        .with_prefilter(PrefilterModel::on_field("label", vec!["media".into()]))
        .with_lookup("artist")
}

pub(crate) fn seed_albums() -> Vec<Album> {
    vec![
        album(
            1,
            "Long Way Home",
            "Hospital Records",
            "CD",
            "London Elektricity",
            "2019-03-01T10:00:00Z",
        ),
        album(
            2,
            "Lost in the Moment",
            "Hospital Records",
            "Vinyl",
            "S.P.Y",
            "2019-06-15T10:00:00Z",
        ),
        album(
            3,
            "Polygon",
            "Med School",
            "Digital",
            "Bop",
            "2019-09-20T10:00:00Z",
        ),
        album(
            4,
            "Fear Not",
            "Med School",
            "CD",
            "Keeno",
            "2020-01-05T10:00:00Z",
        ),
        album(
            5,
            "Sick Music",
            "Hospital Records",
            "Digital",
            "Various Artists",
            "2020-04-10T10:00:00Z",
        ),
    ]
}

pub(crate) fn warm_albums() -> Engine<Album> {
    Engine::warm(vec![WarmEntry::new(
        album_model(),
        EntityData::new(seed_albums()),
    )])
    .expect("album warm should succeed")
}

///
/// RecordingBroadcaster
///
/// Captures every published `(topic, event)` pair for assertions.
///

#[derive(Debug, Default)]
pub(crate) struct RecordingBroadcaster<R> {
    published: Mutex<Vec<(String, ViewEvent<R>)>>,
}

impl<R> RecordingBroadcaster<R> {
    pub(crate) fn new() -> Self {
        Self {
            published: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn published(&self) -> Vec<(String, ViewEvent<R>)>
    where
        R: Clone,
    {
        self.published
            .lock()
            .expect("broadcaster mutex should not be poisoned")
            .clone()
    }
}

impl<R: Clone + Send> Broadcaster<R> for RecordingBroadcaster<R> {
    fn publish(&self, topic: &str, event: ViewEvent<R>) {
        self.published
            .lock()
            .expect("broadcaster mutex should not be poisoned")
            .push((topic.to_string(), event));
    }
}
