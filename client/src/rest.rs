//! [`DataGateway`] over the hosted backend's PostgREST interface.

use std::collections::BTreeSet;
use std::fmt::Display;

use async_trait::async_trait;
use chrono::Utc;
use cragcore::gateway::{DataGateway, Session, SessionStore};
use cragcore::model::{
    compute_stats, Attempt, AttemptPatch, Feedback, GradeLevel, Location, LocationPatch,
    NewAttempt, NewFeedback, NewLocation, NewRoute, Profile, Route, UserStats,
};
use cragcore::telemetry::LogManager;
use cragcore::{GatewayError, GatewayResult};
use reqwest::{Method, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use uuid::Uuid;

use crate::config::ClientConfig;
use crate::rows::{
    AttemptInsert, AttemptRow, AttemptUpdate, FeedbackInsert, FeedbackRow, GradeLevelInsert,
    GradeLevelRow, LocationInsert, LocationRow, LocationUpdate, ProfileRow, RouteDeactivation,
    RouteInsert, RouteRow,
};

/// Locations come with their grade ladder and the owner's display name.
pub const LOCATION_SELECT: &str = "*,grade_levels(*),profiles(display_name)";

type Query = Vec<(&'static str, String)>;

fn eq(value: impl Display) -> String {
    format!("eq.{}", value)
}

fn in_list(ids: &BTreeSet<Uuid>) -> String {
    let joined: Vec<String> = ids.iter().map(Uuid::to_string).collect();
    format!("in.({})", joined.join(","))
}

fn transport(err: reqwest::Error) -> GatewayError {
    GatewayError::Transport(err.to_string())
}

fn first<T>(rows: Vec<T>, what: impl Display) -> GatewayResult<T> {
    rows.into_iter()
        .next()
        .ok_or_else(|| GatewayError::NotFound(what.to_string()))
}

pub struct RestGateway {
    http: reqwest::Client,
    rest_url: String,
    anon_key: String,
    session: SessionStore,
    logger: LogManager,
}

impl RestGateway {
    pub fn new(config: &ClientConfig, session: SessionStore) -> Self {
        Self {
            http: reqwest::Client::new(),
            rest_url: config.rest_url(),
            anon_key: config.anon_key.clone(),
            session,
            logger: LogManager::new("rest"),
        }
    }

    pub fn session(&self) -> &SessionStore {
        &self.session
    }

    fn request(&self, method: Method, table: &str, session: &Session) -> RequestBuilder {
        let returns_rows = method != Method::GET;
        let builder = self
            .http
            .request(method, format!("{}/{}", self.rest_url, table))
            .header("apikey", &self.anon_key)
            .bearer_auth(&session.access_token);
        if returns_rows {
            builder.header("Prefer", "return=representation")
        } else {
            builder
        }
    }

    async fn rows<T: DeserializeOwned>(&self, request: RequestBuilder) -> GatewayResult<Vec<T>> {
        let response = request.send().await.map_err(transport)?;
        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            self.logger
                .warn(&format!("backend returned {}: {}", status, message));
            return Err(if status == StatusCode::UNAUTHORIZED {
                GatewayError::NotAuthenticated
            } else {
                GatewayError::Remote {
                    status: status.as_u16(),
                    message,
                }
            });
        }
        response
            .json::<Vec<T>>()
            .await
            .map_err(|err| GatewayError::Decode(err.to_string()))
    }

    async fn select<T: DeserializeOwned>(
        &self,
        table: &str,
        session: &Session,
        query: Query,
    ) -> GatewayResult<Vec<T>> {
        self.rows(self.request(Method::GET, table, session).query(&query))
            .await
    }

    async fn insert<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        table: &str,
        session: &Session,
        query: Query,
        body: &B,
    ) -> GatewayResult<Vec<T>> {
        self.rows(
            self.request(Method::POST, table, session)
                .query(&query)
                .json(body),
        )
        .await
    }

    async fn update<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        table: &str,
        session: &Session,
        query: Query,
        body: &B,
    ) -> GatewayResult<Vec<T>> {
        self.rows(
            self.request(Method::PATCH, table, session)
                .query(&query)
                .json(body),
        )
        .await
    }

    async fn delete(&self, table: &str, session: &Session, query: Query) -> GatewayResult<usize> {
        let deleted: Vec<serde_json::Value> = self
            .rows(self.request(Method::DELETE, table, session).query(&query))
            .await?;
        Ok(deleted.len())
    }

    async fn location_by_id(&self, session: &Session, id: Uuid) -> GatewayResult<Location> {
        let rows: Vec<LocationRow> = self
            .select(
                "locations",
                session,
                vec![("select", LOCATION_SELECT.into()), ("id", eq(id))],
            )
            .await?;
        first(rows, format!("location {id}")).map(Location::from)
    }
}

#[async_trait]
impl DataGateway for RestGateway {
    async fn list_locations(&self) -> GatewayResult<Vec<Location>> {
        let session = self.session.require()?;
        let rows: Vec<LocationRow> = self
            .select(
                "locations",
                &session,
                vec![
                    ("select", LOCATION_SELECT.into()),
                    ("is_global", eq(true)),
                    ("order", "created_at.desc".into()),
                ],
            )
            .await?;
        Ok(rows.into_iter().map(Location::from).collect())
    }

    async fn create_location(&self, data: NewLocation) -> GatewayResult<Location> {
        let session = self.session.require()?;
        if !data.is_submittable() {
            return Err(GatewayError::Validation("location name is empty".into()));
        }
        let rows: Vec<LocationRow> = self
            .insert(
                "locations",
                &session,
                vec![("select", LOCATION_SELECT.into())],
                &LocationInsert::new(&data, session.user_id),
            )
            .await?;
        let mut location = Location::from(first(rows, "created location")?);

        if !data.grades.is_empty() {
            let grades: Vec<GradeLevelInsert> = data
                .ordered_grades()
                .map(|(order, grade)| GradeLevelInsert::new(location.id, order, grade))
                .collect();
            let created: Vec<GradeLevelRow> = self
                .insert("grade_levels", &session, Vec::new(), grades.as_slice())
                .await?;
            location.grades = created.into_iter().map(GradeLevel::from).collect();
        }
        self.logger.record(&format!(
            "created location {} with {} grades",
            location.name,
            location.grades.len()
        ));
        Ok(location)
    }

    async fn update_location(&self, id: Uuid, patch: LocationPatch) -> GatewayResult<Location> {
        let session = self.session.require()?;
        if patch.is_empty() {
            return self.location_by_id(&session, id).await;
        }
        let rows: Vec<LocationRow> = self
            .update(
                "locations",
                &session,
                vec![
                    ("select", LOCATION_SELECT.into()),
                    ("id", eq(id)),
                    ("created_by", eq(session.user_id)),
                ],
                &LocationUpdate::from(&patch),
            )
            .await?;
        first(rows, format!("location {id}")).map(Location::from)
    }

    async fn delete_location(&self, id: Uuid) -> GatewayResult<()> {
        let session = self.session.require()?;
        let deleted = self
            .delete(
                "locations",
                &session,
                vec![("id", eq(id)), ("created_by", eq(session.user_id))],
            )
            .await?;
        if deleted == 0 {
            return Err(GatewayError::NotFound(format!("location {id}")));
        }
        Ok(())
    }

    async fn list_routes_for_user(&self, location_id: Option<Uuid>) -> GatewayResult<Vec<Route>> {
        let session = self.session.require()?;
        let mut query: Query = vec![
            ("select", "*".into()),
            ("is_active", eq(true)),
            (
                "or",
                format!("(user_id.eq.{},is_personal.eq.false)", session.user_id),
            ),
            ("order", "created_at.desc".into()),
        ];
        if let Some(location_id) = location_id {
            query.push(("location_id", eq(location_id)));
        }
        let rows: Vec<RouteRow> = self.select("routes", &session, query).await?;
        Ok(rows.into_iter().map(Route::from).collect())
    }

    async fn create_route(&self, data: NewRoute) -> GatewayResult<Route> {
        let session = self.session.require()?;
        if !data.is_submittable() {
            return Err(GatewayError::Validation("route name is empty".into()));
        }
        let rows: Vec<RouteRow> = self
            .insert(
                "routes",
                &session,
                Vec::new(),
                &RouteInsert::new(&data, session.user_id),
            )
            .await?;
        first(rows, "created route").map(Route::from)
    }

    async fn deactivate_route(&self, id: Uuid) -> GatewayResult<()> {
        let session = self.session.require()?;
        let rows: Vec<RouteRow> = self
            .update(
                "routes",
                &session,
                vec![("id", eq(id))],
                &RouteDeactivation {
                    is_active: false,
                    removed_at: Utc::now(),
                },
            )
            .await?;
        first(rows, format!("route {id}")).map(|_| ())
    }

    async fn list_attempts_for_user(
        &self,
        location_id: Option<Uuid>,
        route_id: Option<Uuid>,
    ) -> GatewayResult<Vec<Attempt>> {
        let session = self.session.require()?;
        let mut query: Query = vec![
            ("select", "*".into()),
            ("user_id", eq(session.user_id)),
            ("order", "date.desc".into()),
        ];
        if let Some(location_id) = location_id {
            query.push(("location_id", eq(location_id)));
        }
        if let Some(route_id) = route_id {
            query.push(("route_id", eq(route_id)));
        }
        let rows: Vec<AttemptRow> = self.select("attempts", &session, query).await?;
        Ok(rows.into_iter().map(Attempt::from).collect())
    }

    async fn create_attempt(&self, data: NewAttempt) -> GatewayResult<Attempt> {
        let session = self.session.require()?;
        data.validate()?;
        let rows: Vec<AttemptRow> = self
            .insert(
                "attempts",
                &session,
                Vec::new(),
                &AttemptInsert::new(data, session.user_id),
            )
            .await?;
        first(rows, "created attempt").map(Attempt::from)
    }

    async fn update_attempt(&self, id: Uuid, patch: AttemptPatch) -> GatewayResult<Attempt> {
        let session = self.session.require()?;
        patch.validate()?;
        let rows: Vec<AttemptRow> = self
            .update(
                "attempts",
                &session,
                vec![("id", eq(id)), ("user_id", eq(session.user_id))],
                &AttemptUpdate::from(&patch),
            )
            .await?;
        first(rows, format!("attempt {id}")).map(Attempt::from)
    }

    async fn delete_attempt(&self, id: Uuid) -> GatewayResult<()> {
        let session = self.session.require()?;
        let deleted = self
            .delete(
                "attempts",
                &session,
                vec![("id", eq(id)), ("user_id", eq(session.user_id))],
            )
            .await?;
        if deleted == 0 {
            return Err(GatewayError::NotFound(format!("attempt {id}")));
        }
        Ok(())
    }

    async fn get_user_stats(&self, location_id: Option<Uuid>) -> GatewayResult<UserStats> {
        let attempts = self.list_attempts_for_user(location_id, None).await?;
        let route_ids: BTreeSet<Uuid> = attempts.iter().map(|attempt| attempt.route_id).collect();
        if route_ids.is_empty() {
            return Ok(compute_stats(&attempts, &[], &[]));
        }

        let session = self.session.require()?;
        let routes: Vec<Route> = self
            .select::<RouteRow>(
                "routes",
                &session,
                vec![("select", "*".into()), ("id", in_list(&route_ids))],
            )
            .await?
            .into_iter()
            .map(Route::from)
            .collect();

        let grade_ids: BTreeSet<Uuid> = routes.iter().map(|route| route.grade_level_id).collect();
        let grades: Vec<GradeLevel> = if grade_ids.is_empty() {
            Vec::new()
        } else {
            self.select::<GradeLevelRow>(
                "grade_levels",
                &session,
                vec![("select", "*".into()), ("id", in_list(&grade_ids))],
            )
            .await?
            .into_iter()
            .map(GradeLevel::from)
            .collect()
        };
        Ok(compute_stats(&attempts, &routes, &grades))
    }

    async fn submit_feedback(&self, data: NewFeedback) -> GatewayResult<Feedback> {
        let session = self.session.require()?;
        data.validate()?;
        let rows: Vec<FeedbackRow> = self
            .insert(
                "feedback",
                &session,
                Vec::new(),
                &FeedbackInsert::new(data, session.user_id),
            )
            .await?;
        first(rows, "submitted feedback").map(Feedback::from)
    }

    async fn list_approved_feedback(&self) -> GatewayResult<Vec<Feedback>> {
        let session = self.session.require()?;
        let rows: Vec<FeedbackRow> = self
            .select(
                "feedback",
                &session,
                vec![
                    ("select", "*".into()),
                    ("is_approved", eq(true)),
                    ("order", "created_at.desc".into()),
                ],
            )
            .await?;
        Ok(rows.into_iter().map(Feedback::from).collect())
    }

    async fn get_profile(&self) -> GatewayResult<Profile> {
        let session = self.session.require()?;
        let rows: Vec<ProfileRow> = self
            .select(
                "profiles",
                &session,
                vec![
                    ("select", "id,display_name".into()),
                    ("id", eq(session.user_id)),
                ],
            )
            .await?;
        first(rows, format!("profile {}", session.user_id)).map(Profile::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cragcore::model::{default_grade_ladder, Difficulty, LocationKind};
    use serde_json::{json, Value};
    use std::net::SocketAddr;
    use std::sync::{Arc, Mutex};
    use warp::Filter;

    #[derive(Debug, Clone)]
    struct Recorded {
        method: String,
        table: String,
        query: Vec<(String, String)>,
        apikey: Option<String>,
        authorization: Option<String>,
        prefer: Option<String>,
        body: Value,
    }

    impl Recorded {
        fn param(&self, name: &str) -> Option<&str> {
            self.query
                .iter()
                .find(|(key, _)| key == name)
                .map(|(_, value)| value.as_str())
        }
    }

    struct FakeBackend {
        addr: SocketAddr,
        requests: Arc<Mutex<Vec<Recorded>>>,
    }

    impl FakeBackend {
        fn requests(&self) -> Vec<Recorded> {
            self.requests.lock().unwrap().clone()
        }

        fn gateway(&self, session: SessionStore) -> RestGateway {
            let config = ClientConfig {
                base_url: format!("http://{}", self.addr),
                anon_key: "anon".into(),
                ..ClientConfig::default()
            };
            RestGateway::new(&config, session)
        }
    }

    /// Answers `(method, table)` with canned replies, `200 []` otherwise.
    fn spawn_backend(replies: Vec<(&'static str, &'static str, u16, Value)>) -> FakeBackend {
        let requests = Arc::new(Mutex::new(Vec::new()));
        let log = requests.clone();
        let replies = Arc::new(replies);
        let route = warp::path!("rest" / "v1" / String)
            .and(warp::method())
            .and(warp::query::<Vec<(String, String)>>())
            .and(warp::header::headers_cloned())
            .and(warp::body::bytes())
            .map(
                move |table: String,
                      method: warp::http::Method,
                      query: Vec<(String, String)>,
                      headers: warp::http::HeaderMap,
                      body: warp::hyper::body::Bytes| {
                    let header = |name: &str| {
                        headers
                            .get(name)
                            .and_then(|value| value.to_str().ok())
                            .map(str::to_string)
                    };
                    log.lock().unwrap().push(Recorded {
                        method: method.to_string(),
                        table: table.clone(),
                        query,
                        apikey: header("apikey"),
                        authorization: header("authorization"),
                        prefer: header("prefer"),
                        body: serde_json::from_slice(&body).unwrap_or(Value::Null),
                    });
                    let (status, reply) = replies
                        .iter()
                        .find(|(m, t, _, _)| *m == method.as_str() && *t == table)
                        .map(|(_, _, status, reply)| (*status, reply.clone()))
                        .unwrap_or((200, json!([])));
                    warp::reply::with_status(
                        warp::reply::json(&reply),
                        warp::http::StatusCode::from_u16(status).unwrap(),
                    )
                },
            );
        let (addr, server) = warp::serve(route).bind_ephemeral(([127, 0, 0, 1], 0));
        tokio::spawn(server);
        FakeBackend { addr, requests }
    }

    fn signed_in(user: Uuid) -> SessionStore {
        SessionStore::signed_in(Session::new(user, "token"))
    }

    fn location_json(id: Uuid, owner: Uuid) -> Value {
        json!({
            "id": id,
            "name": "Boulderhaus",
            "type": "gym",
            "address": "Main St 1",
            "latitude": 52.5,
            "longitude": 13.4,
            "created_by": owner,
            "created_at": "2024-05-01T08:00:00Z",
            "route_frequency": "weekly",
            "is_global": true,
            "grade_levels": [],
            "profiles": {"display_name": "Robin"}
        })
    }

    fn route_json(id: Uuid, grade: Uuid, location: Uuid, owner: Uuid) -> Value {
        json!({
            "id": id,
            "name": "Blue · 4 holds",
            "color": "#3b82f6",
            "grade_level_id": grade,
            "location_id": location,
            "is_active": true,
            "is_personal": false,
            "user_id": owner,
            "created_at": "2024-05-02T08:00:00Z",
            "removed_at": null
        })
    }

    #[tokio::test]
    async fn list_locations_sends_keys_and_embeds() {
        let user = Uuid::new_v4();
        let id = Uuid::new_v4();
        let backend = spawn_backend(vec![(
            "GET",
            "locations",
            200,
            json!([location_json(id, user)]),
        )]);
        let gateway = backend.gateway(signed_in(user));

        let locations = gateway.list_locations().await.unwrap();
        assert_eq!(locations.len(), 1);
        assert_eq!(locations[0].id, id);
        assert_eq!(locations[0].owner_name, "Robin");

        let request = &backend.requests()[0];
        assert_eq!(request.apikey.as_deref(), Some("anon"));
        assert_eq!(request.authorization.as_deref(), Some("Bearer token"));
        assert_eq!(request.param("select"), Some(LOCATION_SELECT));
        assert_eq!(request.prefer, None);
    }

    #[tokio::test]
    async fn calls_without_session_never_reach_backend() {
        let backend = spawn_backend(Vec::new());
        let gateway = backend.gateway(SessionStore::new());

        assert_eq!(
            gateway.list_locations().await,
            Err(GatewayError::NotAuthenticated)
        );
        assert_eq!(
            gateway.get_user_stats(None).await,
            Err(GatewayError::NotAuthenticated)
        );
        assert!(backend.requests().is_empty());
    }

    #[tokio::test]
    async fn status_codes_map_to_errors() {
        let backend = spawn_backend(vec![
            ("GET", "feedback", 401, json!({"message": "JWT expired"})),
            ("GET", "routes", 500, json!({"message": "boom"})),
        ]);
        let gateway = backend.gateway(signed_in(Uuid::new_v4()));

        assert_eq!(
            gateway.list_approved_feedback().await,
            Err(GatewayError::NotAuthenticated)
        );
        assert!(matches!(
            gateway.list_routes_for_user(None).await,
            Err(GatewayError::Remote { status: 500, .. })
        ));
    }

    #[tokio::test]
    async fn create_location_inserts_ordered_grades() {
        let user = Uuid::new_v4();
        let id = Uuid::new_v4();
        let grade_rows: Vec<Value> = default_grade_ladder()
            .iter()
            .enumerate()
            .map(|(index, grade)| {
                json!({
                    "id": Uuid::new_v4(),
                    "location_id": id,
                    "color": grade.color,
                    "name": grade.name,
                    "difficulty_level": grade.difficulty,
                    "order_index": index + 1
                })
            })
            .collect();
        let backend = spawn_backend(vec![
            ("POST", "locations", 201, json!([location_json(id, user)])),
            ("POST", "grade_levels", 201, Value::Array(grade_rows)),
        ]);
        let gateway = backend.gateway(signed_in(user));

        let location = gateway
            .create_location(
                NewLocation::new("Boulderhaus", LocationKind::Gym)
                    .with_grades(default_grade_ladder()),
            )
            .await
            .unwrap();
        assert_eq!(location.grades.len(), 5);
        assert_eq!(location.sorted_grades()[4].difficulty, Difficulty::Expert);

        let requests = backend.requests();
        assert_eq!(requests[0].prefer.as_deref(), Some("return=representation"));
        assert_eq!(requests[0].body["created_by"], json!(user));
        assert_eq!(requests[1].table, "grade_levels");
        assert_eq!(requests[1].body[0]["order_index"], 1);
        assert_eq!(requests[1].body[4]["order_index"], 5);
        assert_eq!(requests[1].body[4]["location_id"], json!(id));
    }

    #[tokio::test]
    async fn signed_out_invalid_forms_report_sign_in() {
        let backend = spawn_backend(Vec::new());
        let gateway = backend.gateway(SessionStore::new());
        assert_eq!(
            gateway
                .create_location(NewLocation::new("", LocationKind::Gym))
                .await,
            Err(GatewayError::NotAuthenticated)
        );
        assert_eq!(
            gateway.submit_feedback(NewFeedback::new(0, "")).await,
            Err(GatewayError::NotAuthenticated)
        );
        assert_eq!(
            gateway
                .update_attempt(Uuid::new_v4(), AttemptPatch::default().with_attempts(0))
                .await,
            Err(GatewayError::NotAuthenticated)
        );
        assert!(backend.requests().is_empty());
    }

    #[tokio::test]
    async fn blank_location_name_is_rejected_locally() {
        let backend = spawn_backend(Vec::new());
        let gateway = backend.gateway(signed_in(Uuid::new_v4()));
        let result = gateway
            .create_location(NewLocation::new("  ", LocationKind::Outdoor))
            .await;
        assert!(matches!(result, Err(GatewayError::Validation(_))));
        assert!(backend.requests().is_empty());
    }

    #[tokio::test]
    async fn route_listing_filters_visibility() {
        let user = Uuid::new_v4();
        let location = Uuid::new_v4();
        let backend = spawn_backend(Vec::new());
        let gateway = backend.gateway(signed_in(user));

        gateway.list_routes_for_user(Some(location)).await.unwrap();
        let request = &backend.requests()[0];
        assert_eq!(request.param("is_active"), Some("eq.true"));
        let visibility = format!("(user_id.eq.{},is_personal.eq.false)", user);
        assert_eq!(request.param("or"), Some(visibility.as_str()));
        let location_filter = format!("eq.{}", location);
        assert_eq!(request.param("location_id"), Some(location_filter.as_str()));
    }

    #[tokio::test]
    async fn deactivation_patches_and_reports_missing() {
        let backend = spawn_backend(Vec::new());
        let gateway = backend.gateway(signed_in(Uuid::new_v4()));
        let id = Uuid::new_v4();

        let result = gateway.deactivate_route(id).await;
        assert!(matches!(result, Err(GatewayError::NotFound(_))));

        let request = &backend.requests()[0];
        assert_eq!(request.method, "PATCH");
        assert_eq!(request.body["is_active"], false);
        assert!(request.body["removed_at"].is_string());
    }

    #[tokio::test]
    async fn zero_attempt_count_is_rejected_locally() {
        let backend = spawn_backend(Vec::new());
        let gateway = backend.gateway(signed_in(Uuid::new_v4()));
        let result = gateway
            .update_attempt(Uuid::new_v4(), AttemptPatch::default().with_attempts(0))
            .await;
        assert!(matches!(result, Err(GatewayError::Validation(_))));
        assert!(backend.requests().is_empty());
    }

    #[tokio::test]
    async fn stats_join_attempts_routes_and_grades() {
        let user = Uuid::new_v4();
        let location = Uuid::new_v4();
        let route = Uuid::new_v4();
        let grade = Uuid::new_v4();
        let attempt = |completed: bool, route_id: Uuid| {
            json!({
                "id": Uuid::new_v4(),
                "route_id": route_id,
                "location_id": location,
                "completed": completed,
                "attempts": 3,
                "date": "2024-05-03",
                "notes": null
            })
        };
        let backend = spawn_backend(vec![
            (
                "GET",
                "attempts",
                200,
                json!([
                    attempt(true, route),
                    attempt(false, route),
                    attempt(true, Uuid::new_v4())
                ]),
            ),
            (
                "GET",
                "routes",
                200,
                json!([route_json(route, grade, location, user)]),
            ),
            (
                "GET",
                "grade_levels",
                200,
                json!([{
                    "id": grade, "color": "#3b82f6", "name": "Blue",
                    "difficulty_level": "intermediate", "order_index": 3
                }]),
            ),
        ]);
        let gateway = backend.gateway(signed_in(user));

        let stats = gateway.get_user_stats(Some(location)).await.unwrap();
        assert_eq!(stats.total_attempts, 3);
        assert_eq!(stats.completed_attempts, 2);
        let bucket = stats.stats_by_difficulty[&Difficulty::Intermediate];
        assert_eq!((bucket.attempts, bucket.completed), (2, 1));

        let requests = backend.requests();
        assert_eq!(requests.len(), 3);
        assert!(requests[1].param("id").unwrap().starts_with("in.("));
    }

    #[tokio::test]
    async fn stats_without_attempts_skip_joins() {
        let backend = spawn_backend(Vec::new());
        let gateway = backend.gateway(signed_in(Uuid::new_v4()));
        let stats = gateway.get_user_stats(None).await.unwrap();
        assert_eq!(stats, UserStats::default());
        assert_eq!(backend.requests().len(), 1);
    }
}
