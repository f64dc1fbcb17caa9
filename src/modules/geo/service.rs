use std::sync::Arc;

use uuid::Uuid;

use crate::{
    api::error,
    modules::{
        event::repository::EventRepository,
        geo::{
            distance::{haversine_km, Point},
            model::{DistanceResponse, LocationResponse, NearbyEvent, NearbyUser},
            repository::LocationRepository,
        },
    },
};

#[derive(Clone)]
pub struct GeoService<L, E>
where
    L: LocationRepository,
    E: EventRepository,
{
    location_repo: Arc<L>,
    event_repo: Arc<E>,
    default_radius_km: f64,
}

impl<L, E> GeoService<L, E>
where
    L: LocationRepository,
    E: EventRepository,
{
    pub fn with_dependencies(
        location_repo: Arc<L>,
        event_repo: Arc<E>,
        default_radius_km: f64,
    ) -> Self {
        GeoService { location_repo, event_repo, default_radius_km }
    }

    /// Records the caller's last known position. Invoked by the transport
    /// boundary (presence middleware or the explicit endpoint), never as a
    /// hidden side effect of a read.
    pub async fn record_presence(
        &self,
        user_id: Uuid,
        lat: f64,
        lon: f64,
    ) -> Result<(), error::SystemError> {
        let position = Point::new(lat, lon)?;
        self.location_repo.upsert_user_location(&user_id, position).await
    }

    pub async fn set_event_location(
        &self,
        organizer_id: Uuid,
        event_id: Uuid,
        lat: f64,
        lon: f64,
    ) -> Result<(), error::SystemError> {
        let event = self
            .event_repo
            .find_event_by_id(&event_id)
            .await?
            .ok_or_else(|| error::SystemError::not_found("Event not found"))?;

        if event.organizer_id != organizer_id {
            return Err(error::SystemError::forbidden(
                "Only the organizer may set the event location",
            ));
        }

        let position = Point::new(lat, lon)?;
        self.location_repo.upsert_event_location(&event_id, position).await
    }

    pub async fn user_location(
        &self,
        user_id: Uuid,
    ) -> Result<LocationResponse, error::SystemError> {
        let location = self
            .location_repo
            .find_user_location(&user_id)
            .await?
            .ok_or_else(|| error::SystemError::location_unknown("User location is unknown"))?;

        Ok(LocationResponse { lat: location.lat, lon: location.lon, updated_at: location.updated_at })
    }

    pub async fn event_location(
        &self,
        event_id: Uuid,
    ) -> Result<LocationResponse, error::SystemError> {
        let location = self
            .location_repo
            .find_event_location(&event_id)
            .await?
            .ok_or_else(|| error::SystemError::location_unknown("Event location is unknown"))?;

        Ok(LocationResponse { lat: location.lat, lon: location.lon, updated_at: location.updated_at })
    }

    pub async fn distance_to_user(
        &self,
        requester_id: Uuid,
        target_id: Uuid,
    ) -> Result<DistanceResponse, error::SystemError> {
        let origin = self.requester_position(&requester_id).await?;

        let target = self
            .location_repo
            .find_user_location(&target_id)
            .await?
            .ok_or_else(|| error::SystemError::not_found("Target user location not found"))?;

        let distance_km = haversine_km(origin, Point::new(target.lat, target.lon)?);
        Ok(DistanceResponse { distance_km })
    }

    pub async fn distance_to_event(
        &self,
        requester_id: Uuid,
        event_id: Uuid,
    ) -> Result<DistanceResponse, error::SystemError> {
        let origin = self.requester_position(&requester_id).await?;

        let target = self
            .location_repo
            .find_event_location(&event_id)
            .await?
            .ok_or_else(|| error::SystemError::not_found("Event location not found"))?;

        let distance_km = haversine_km(origin, Point::new(target.lat, target.lon)?);
        Ok(DistanceResponse { distance_km })
    }

    /// Users within the radius, nearest first. The requester is excluded.
    pub async fn nearby_users(
        &self,
        requester_id: Uuid,
        max_distance_km: Option<f64>,
    ) -> Result<Vec<NearbyUser>, error::SystemError> {
        let origin = self.requester_position(&requester_id).await?;
        let max = max_distance_km.unwrap_or(self.default_radius_km);

        let locations = self.location_repo.list_user_locations(&requester_id).await?;

        let mut nearby: Vec<NearbyUser> = Vec::new();
        for row in locations {
            let distance_km = haversine_km(origin, Point::new(row.lat, row.lon)?);
            if distance_km <= max {
                nearby.push(NearbyUser {
                    user_id: row.user_id,
                    first_name: row.first_name,
                    last_name: row.last_name,
                    distance_km,
                });
            }
        }

        nearby.sort_by(|a, b| a.distance_km.total_cmp(&b.distance_km));
        Ok(nearby)
    }

    /// Events within the radius, nearest first.
    pub async fn nearby_events(
        &self,
        requester_id: Uuid,
        max_distance_km: Option<f64>,
    ) -> Result<Vec<NearbyEvent>, error::SystemError> {
        let origin = self.requester_position(&requester_id).await?;
        let max = max_distance_km.unwrap_or(self.default_radius_km);

        let locations = self.location_repo.list_event_locations().await?;

        let mut nearby: Vec<NearbyEvent> = Vec::new();
        for row in locations {
            let distance_km = haversine_km(origin, Point::new(row.lat, row.lon)?);
            if distance_km <= max {
                nearby.push(NearbyEvent { event_id: row.event_id, name: row.name, distance_km });
            }
        }

        nearby.sort_by(|a, b| a.distance_km.total_cmp(&b.distance_km));
        Ok(nearby)
    }

    async fn requester_position(&self, requester_id: &Uuid) -> Result<Point, error::SystemError> {
        let location = self
            .location_repo
            .find_user_location(requester_id)
            .await?
            .ok_or_else(|| error::SystemError::location_unknown("Your location is unknown"))?;

        Point::new(location.lat, location.lon)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    use crate::modules::event::model::{CreateEventModel, MemberResponse};
    use crate::modules::event::schema::EventEntity;
    use crate::modules::geo::model::{EventLocationRow, UserLocationRow};
    use crate::modules::geo::schema::{EventLocationEntity, UserLocationEntity};

    fn uuid(n: u128) -> Uuid {
        Uuid::from_u128(n)
    }

    #[derive(Default)]
    struct MemLocationRepo {
        users: Mutex<Vec<UserLocationEntity>>,
        events: Mutex<Vec<(EventLocationEntity, String)>>,
    }

    #[async_trait::async_trait]
    impl LocationRepository for MemLocationRepo {
        async fn upsert_user_location(
            &self,
            user_id: &Uuid,
            position: Point,
        ) -> Result<(), error::SystemError> {
            let mut users = self.users.lock().unwrap();
            let record = UserLocationEntity {
                user_id: *user_id,
                lat: position.lat(),
                lon: position.lon(),
                updated_at: chrono::Utc::now(),
            };
            match users.iter_mut().find(|l| l.user_id == *user_id) {
                Some(existing) => *existing = record,
                None => users.push(record),
            }
            Ok(())
        }

        async fn find_user_location(
            &self,
            user_id: &Uuid,
        ) -> Result<Option<UserLocationEntity>, error::SystemError> {
            Ok(self.users.lock().unwrap().iter().find(|l| l.user_id == *user_id).cloned())
        }

        async fn list_user_locations(
            &self,
            exclude_user_id: &Uuid,
        ) -> Result<Vec<UserLocationRow>, error::SystemError> {
            Ok(self
                .users
                .lock()
                .unwrap()
                .iter()
                .filter(|l| l.user_id != *exclude_user_id)
                .map(|l| UserLocationRow {
                    user_id: l.user_id,
                    first_name: "Test".into(),
                    last_name: "User".into(),
                    lat: l.lat,
                    lon: l.lon,
                })
                .collect())
        }

        async fn upsert_event_location(
            &self,
            event_id: &Uuid,
            position: Point,
        ) -> Result<(), error::SystemError> {
            let mut events = self.events.lock().unwrap();
            let record = EventLocationEntity {
                event_id: *event_id,
                lat: position.lat(),
                lon: position.lon(),
                updated_at: chrono::Utc::now(),
            };
            match events.iter_mut().find(|(l, _)| l.event_id == *event_id) {
                Some(existing) => existing.0 = record,
                None => events.push((record, "Event".into())),
            }
            Ok(())
        }

        async fn find_event_location(
            &self,
            event_id: &Uuid,
        ) -> Result<Option<EventLocationEntity>, error::SystemError> {
            Ok(self
                .events
                .lock()
                .unwrap()
                .iter()
                .find(|(l, _)| l.event_id == *event_id)
                .map(|(l, _)| l.clone()))
        }

        async fn list_event_locations(
            &self,
        ) -> Result<Vec<EventLocationRow>, error::SystemError> {
            Ok(self
                .events
                .lock()
                .unwrap()
                .iter()
                .map(|(l, name)| EventLocationRow {
                    event_id: l.event_id,
                    name: name.clone(),
                    lat: l.lat,
                    lon: l.lon,
                })
                .collect())
        }
    }

    struct MemEventRepo {
        events: Mutex<Vec<EventEntity>>,
    }

    #[async_trait::async_trait]
    impl EventRepository for MemEventRepo {
        async fn find_event_by_id(
            &self,
            event_id: &Uuid,
        ) -> Result<Option<EventEntity>, error::SystemError> {
            Ok(self.events.lock().unwrap().iter().find(|e| e.id == *event_id).cloned())
        }

        async fn create_event(
            &self,
            _organizer_id: &Uuid,
            _event: &CreateEventModel,
        ) -> Result<EventEntity, error::SystemError> {
            unimplemented!("not used in these tests")
        }

        async fn list_upcoming(
            &self,
            _limit: i32,
        ) -> Result<Vec<EventEntity>, error::SystemError> {
            Ok(Vec::new())
        }

        async fn list_members(
            &self,
            _event_id: &Uuid,
        ) -> Result<Vec<MemberResponse>, error::SystemError> {
            Ok(Vec::new())
        }

        async fn is_member(
            &self,
            _event_id: &Uuid,
            _user_id: &Uuid,
        ) -> Result<bool, error::SystemError> {
            Ok(false)
        }
    }

    fn service() -> GeoService<MemLocationRepo, MemEventRepo> {
        GeoService::with_dependencies(
            Arc::new(MemLocationRepo::default()),
            Arc::new(MemEventRepo { events: Mutex::new(Vec::new()) }),
            500.0,
        )
    }

    #[tokio::test]
    async fn nearby_filters_sorts_and_excludes_requester() {
        let svc = service();
        let (me, same, near, far) = (uuid(1), uuid(2), uuid(3), uuid(4));

        // requester in central Moscow; one user at the same point, one
        // roughly 10 km north, one roughly 600 km north
        svc.record_presence(me, 55.7558, 37.6173).await.unwrap();
        svc.record_presence(same, 55.7558, 37.6173).await.unwrap();
        svc.record_presence(near, 55.8458, 37.6173).await.unwrap();
        svc.record_presence(far, 61.1558, 37.6173).await.unwrap();

        let nearby = svc.nearby_users(me, None).await.unwrap();

        let ids: Vec<Uuid> = nearby.iter().map(|n| n.user_id).collect();
        assert_eq!(ids, vec![same, near]);
        assert!(nearby[0].distance_km < 0.001);
        assert!((nearby[1].distance_km - 10.0).abs() < 0.5);
    }

    #[tokio::test]
    async fn caller_radius_overrides_default() {
        let svc = service();
        let (me, far) = (uuid(1), uuid(4));

        svc.record_presence(me, 55.7558, 37.6173).await.unwrap();
        svc.record_presence(far, 61.1558, 37.6173).await.unwrap();

        assert!(svc.nearby_users(me, None).await.unwrap().is_empty());

        let nearby = svc.nearby_users(me, Some(700.0)).await.unwrap();
        assert_eq!(nearby.len(), 1);
        assert_eq!(nearby[0].user_id, far);
    }

    #[tokio::test]
    async fn requester_without_location_is_distinct_from_missing_target() {
        let svc = service();
        let (me, other) = (uuid(1), uuid(2));

        let err = svc.nearby_users(me, None).await.unwrap_err();
        assert!(matches!(err, error::SystemError::LocationUnknown(_)));

        svc.record_presence(me, 55.7558, 37.6173).await.unwrap();

        let err = svc.distance_to_user(me, other).await.unwrap_err();
        assert!(matches!(err, error::SystemError::NotFound(_)));
    }

    #[tokio::test]
    async fn presence_upsert_is_last_writer_wins() {
        let svc = service();
        let me = uuid(1);

        svc.record_presence(me, 55.7558, 37.6173).await.unwrap();
        svc.record_presence(me, 59.93, 30.34).await.unwrap();

        let location = svc.user_location(me).await.unwrap();
        assert!((location.lat - 59.93).abs() < 1e-9);
        assert!((location.lon - 30.34).abs() < 1e-9);
    }

    #[tokio::test]
    async fn invalid_coordinates_are_rejected() {
        let svc = service();
        let err = svc.record_presence(uuid(1), 91.0, 0.0).await.unwrap_err();
        assert!(matches!(err, error::SystemError::BadRequest(_)));
    }
}
