use actix_web::{
    delete, get, post, route,
    web::{self, Data, Path, ServiceConfig, scope},
    HttpResponse,
};
use actix_web_validator::Json;
use tracing::info;
use validator::Validate;

use super::actions;
use super::models::JobApplicationId;
use super::policy::{Ability, JobApplicationPolicy};
use super::requests::{StoreJobApplicationRequest, UpdateJobApplicationRequest};
use crate::api::auth::Caller;
use crate::api::envelope::Envelope;
use crate::api::error::AppError;
use crate::db::JobApplicationStore;

// Extractor order matters: identity (401) resolves before the body (422).
// Update is the exception: its field rules run after the record lookup, so
// an unknown id is 404 for any JSON object body.

#[get("")]
async fn index(
    caller: Caller,
    store: Data<dyn JobApplicationStore>,
) -> Result<HttpResponse, AppError> {
    JobApplicationPolicy::authorize(caller.id(), Ability::ViewAny, None)?;

    let applications = actions::list_job_applications(store.get_ref(), caller.id()).await?;

    Ok(HttpResponse::Ok().json(Envelope::success(
        "Job applications retrieved successfully",
        applications,
    )))
}

#[post("")]
async fn create(
    caller: Caller,
    store: Data<dyn JobApplicationStore>,
    request: Json<StoreJobApplicationRequest>,
) -> Result<HttpResponse, AppError> {
    JobApplicationPolicy::authorize(caller.id(), Ability::Create, None)?;

    let draft = request.into_inner().into_draft()?;
    let application =
        actions::create_job_application(store.get_ref(), Some(caller.id()), draft).await?;

    Ok(HttpResponse::Created().json(Envelope::success(
        "Job application created successfully",
        application,
    )))
}

#[get("/{id}")]
async fn show(
    caller: Caller,
    store: Data<dyn JobApplicationStore>,
    id: Path<JobApplicationId>,
) -> Result<HttpResponse, AppError> {
    let application = actions::find_job_application(store.get_ref(), id.into_inner()).await?;
    JobApplicationPolicy::authorize(caller.id(), Ability::View, Some(&application))?;

    Ok(HttpResponse::Ok().json(Envelope::success(
        "Job application retrieved successfully",
        application,
    )))
}

#[route("/{id}", method = "PUT", method = "PATCH")]
async fn update(
    caller: Caller,
    store: Data<dyn JobApplicationStore>,
    id: Path<JobApplicationId>,
    request: web::Json<UpdateJobApplicationRequest>,
) -> Result<HttpResponse, AppError> {
    let application = actions::find_job_application(store.get_ref(), id.into_inner()).await?;

    let request = request.into_inner();
    request.validate()?;
    let changes = request.into_changes()?;

    JobApplicationPolicy::authorize(caller.id(), Ability::Update, Some(&application))?;

    let updated = actions::update_job_application(store.get_ref(), application, changes).await?;

    Ok(HttpResponse::Ok().json(Envelope::success(
        "Job application updated successfully",
        updated,
    )))
}

#[delete("/{id}")]
async fn destroy(
    caller: Caller,
    store: Data<dyn JobApplicationStore>,
    id: Path<JobApplicationId>,
) -> Result<HttpResponse, AppError> {
    let application = actions::find_job_application(store.get_ref(), id.into_inner()).await?;
    JobApplicationPolicy::authorize(caller.id(), Ability::Delete, Some(&application))?;

    if !actions::delete_job_application(store.get_ref(), &application).await? {
        return Err(AppError::DeleteFailed(application.id));
    }

    info!("User {} deleted job application {}", caller.id(), application.id);
    Ok(HttpResponse::Ok().json(Envelope::empty("Job application deleted successfully")))
}

pub fn job_application_config(config: &mut ServiceConfig) {
    config.service(
        scope("/api/v1/job-applications")
            .service(index)
            .service(create)
            .service(show)
            .service(update)
            .service(destroy),
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::job_application::models::{
        JobApplication, JobApplicationChanges, NewJobApplication, UserId,
    };
    use crate::api::validation::{json_config, path_config, unvalidated_json_config};
    use crate::db::{MemoryJobApplicationStore, StoreError};
    use actix_web::{http::StatusCode, test, App};
    use async_trait::async_trait;
    use serde_json::{json, Value};
    use std::sync::Arc;

    const BASE: &str = "/api/v1/job-applications";

    macro_rules! test_app {
        ($store:expr) => {{
            let store: Arc<dyn JobApplicationStore> = Arc::new($store);
            test::init_service(
                App::new()
                    .app_data(Data::from(store))
                    .app_data(json_config())
                    .app_data(unvalidated_json_config())
                    .app_data(path_config())
                    .configure(job_application_config),
            )
            .await
        }};
        () => {
            test_app!(MemoryJobApplicationStore::new())
        };
    }

    /// Sends the request and returns the status with the decoded JSON body
    macro_rules! send {
        ($app:expr, $req:expr) => {{
            let response = test::call_service(&$app, $req.to_request()).await;
            let status = response.status();
            let body: Value = test::read_body_json(response).await;
            (status, body)
        }};
    }

    /// Creates the example application as `user` and returns its `data`
    macro_rules! create_as {
        ($app:expr, $user:expr) => {{
            let (status, body) = send!(
                $app,
                as_user(test::TestRequest::post().uri(BASE), $user).set_json(example_body())
            );
            assert_eq!(status, StatusCode::CREATED);
            body["data"].clone()
        }};
    }

    fn as_user(req: test::TestRequest, user: UserId) -> test::TestRequest {
        req.insert_header(("x-user-id", user.to_string()))
    }

    fn get(uri: &str, user: UserId) -> test::TestRequest {
        as_user(test::TestRequest::get().uri(uri), user)
    }

    fn example_body() -> Value {
        json!({
            "link": "https://x.com/job",
            "title": "Eng",
            "position": "Backend",
            "company": "Acme",
        })
    }

    #[actix_web::test]
    async fn create_update_and_foreign_view_scenario() {
        let app = test_app!();

        let created = create_as!(app, 1);
        assert_eq!(created["status"], "pending");
        assert_eq!(created["user_id"], 1);
        let uri = format!("{BASE}/{}", created["id"]);

        let (status, body) = send!(
            app,
            as_user(test::TestRequest::patch().uri(&uri), 1).set_json(json!({"status": "interview"}))
        );
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "success");
        assert_eq!(body["message"], "Job application updated successfully");
        assert_eq!(body["data"]["status"], "interview");
        for field in ["link", "title", "position", "company", "notes", "user_id", "created_at"] {
            assert_eq!(body["data"][field], created[field], "{field} changed");
        }

        let (status, body) = send!(app, get(&uri, 2));
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body["status"], "error");
        assert_eq!(body["message"], "This action is unauthorized.");
        assert_eq!(body["data"], Value::Null);
    }

    #[actix_web::test]
    async fn create_ignores_client_supplied_owner() {
        let app = test_app!();
        let mut body = example_body();
        body["user_id"] = json!(999);
        body["status"] = json!("in_progress");
        body["notes"] = json!("referral from Sam");

        let (status, body) = send!(
            app,
            as_user(test::TestRequest::post().uri(BASE), 5).set_json(body)
        );
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["message"], "Job application created successfully");
        assert_eq!(body["data"]["user_id"], 5);
        assert_eq!(body["data"]["status"], "in_progress");
        assert_eq!(body["data"]["notes"], "referral from Sam");
    }

    #[actix_web::test]
    async fn create_with_bad_link_is_422_naming_link() {
        let app = test_app!();
        for link in [json!(""), json!(null), json!("not-a-valid-url")] {
            let mut body = example_body();
            body["link"] = link;
            let (status, body) = send!(
                app,
                as_user(test::TestRequest::post().uri(BASE), 1).set_json(body)
            );
            assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
            assert_eq!(body["message"], "The given data was invalid.");
            assert!(body["errors"]["link"].is_array());
            assert_eq!(body["errors"].as_object().unwrap().len(), 1);
        }

        let mut body = example_body();
        body.as_object_mut().unwrap().remove("link");
        let (status, body) = send!(
            app,
            as_user(test::TestRequest::post().uri(BASE), 1).set_json(body)
        );
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["errors"]["link"][0], "The link field is required.");
    }

    #[actix_web::test]
    async fn invalid_status_is_rejected_on_both_paths() {
        let app = test_app!();
        let mut body = example_body();
        body["status"] = json!("In Progress");
        let (status, body) = send!(
            app,
            as_user(test::TestRequest::post().uri(BASE), 1).set_json(body)
        );
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert!(body["errors"]["status"].is_array());

        let created = create_as!(app, 1);
        let uri = format!("{BASE}/{}", created["id"]);
        let (status, body) = send!(
            app,
            as_user(test::TestRequest::put().uri(&uri), 1).set_json(json!({"status": "ghosted"}))
        );
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert!(body["errors"]["status"].is_array());

        let (_, body) = send!(app, get(&uri, 1));
        assert_eq!(body["data"]["status"], "pending");
    }

    #[actix_web::test]
    async fn wrong_field_types_are_422_naming_the_field() {
        let app = test_app!();
        let (status, body) = send!(
            app,
            as_user(test::TestRequest::post().uri(BASE), 1)
                .set_json(json!({"link": 12, "title": 12, "position": "Backend", "company": "Acme"}))
        );
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["errors"]["link"][0], "The link field must be a string.");
        assert_eq!(body["errors"]["title"][0], "The title field must be a string.");
        assert!(body["errors"].get("body").is_none());

        let created = create_as!(app, 1);
        let uri = format!("{BASE}/{}", created["id"]);
        let (status, body) = send!(
            app,
            as_user(test::TestRequest::patch().uri(&uri), 1).set_json(json!({"company": false}))
        );
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["errors"]["company"][0], "The company field must be a string.");
    }

    #[actix_web::test]
    async fn non_object_body_is_422_without_parser_detail() {
        let app = test_app!();
        let created = create_as!(app, 1);
        let uri = format!("{BASE}/{}", created["id"]);

        for req in [
            test::TestRequest::post().uri(BASE).set_json(json!("https://x.com/job")),
            test::TestRequest::put().uri(&uri).set_json(json!(42)),
        ] {
            let (status, body) = send!(app, as_user(req, 1));
            assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
            assert_eq!(body["errors"]["body"][0], "The request body must be a JSON object.");
            let rendered = body.to_string();
            for detail in ["line", "column", "deserialize", "Payload"] {
                assert!(!rendered.contains(detail), "{rendered}");
            }
        }
    }

    #[actix_web::test]
    async fn non_web_links_are_rejected_on_both_paths() {
        let app = test_app!();
        let created = create_as!(app, 1);
        let uri = format!("{BASE}/{}", created["id"]);

        for link in ["javascript:alert(1)", "a:b", "mailto:x@y.z"] {
            let mut body = example_body();
            body["link"] = json!(link);
            let (status, body) = send!(
                app,
                as_user(test::TestRequest::post().uri(BASE), 1).set_json(body)
            );
            assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY, "{link}");
            assert_eq!(body["errors"]["link"][0], "The link field must be a valid URL.");

            let (status, _) = send!(
                app,
                as_user(test::TestRequest::patch().uri(&uri), 1).set_json(json!({"link": link}))
            );
            assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY, "{link}");
        }

        let (_, body) = send!(app, get(&uri, 1));
        assert_eq!(body["data"]["link"], "https://x.com/job");
    }

    #[actix_web::test]
    async fn update_rejects_null_and_blank_required_fields() {
        let app = test_app!();
        let created = create_as!(app, 1);
        let uri = format!("{BASE}/{}", created["id"]);

        let (status, body) = send!(
            app,
            as_user(test::TestRequest::patch().uri(&uri), 1)
                .set_json(json!({"title": null, "link": null}))
        );
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["errors"]["title"][0], "The title field is required.");
        assert!(body["errors"]["link"].is_array());

        let (status, body) = send!(
            app,
            as_user(test::TestRequest::put().uri(&uri), 1).set_json(json!({"position": "   "}))
        );
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert!(body["errors"]["position"].is_array());

        let (_, body) = send!(app, get(&uri, 1));
        assert_eq!(body["data"], created);
    }

    #[actix_web::test]
    async fn blank_text_is_rejected_and_padding_trimmed_on_create() {
        let app = test_app!();
        let mut body = example_body();
        body["company"] = json!("  ");
        let (status, body) = send!(
            app,
            as_user(test::TestRequest::post().uri(BASE), 1).set_json(body)
        );
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["errors"]["company"][0], "The company field is required.");

        let mut body = example_body();
        body["title"] = json!("  Eng  ");
        let (status, body) = send!(
            app,
            as_user(test::TestRequest::post().uri(BASE), 1).set_json(body)
        );
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["data"]["title"], "Eng");
    }

    #[actix_web::test]
    async fn requests_without_identity_are_401() {
        let app = test_app!();
        let (status, body) = send!(app, test::TestRequest::get().uri(BASE));
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["status"], "error");

        // identity is checked before the body
        let (status, _) = send!(app, test::TestRequest::post().uri(BASE).set_json(json!({})));
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[actix_web::test]
    async fn list_is_scoped_and_newest_first() {
        let app = test_app!();
        let first = create_as!(app, 1);
        let foreign = create_as!(app, 2);
        let second = create_as!(app, 1);

        let (status, body) = send!(app, get(BASE, 1));
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["message"], "Job applications retrieved successfully");
        let ids: Vec<Value> = body["data"]
            .as_array()
            .unwrap()
            .iter()
            .map(|a| a["id"].clone())
            .collect();
        assert_eq!(ids, vec![second["id"].clone(), first["id"].clone()]);
        assert!(!ids.contains(&foreign["id"]));

        let (_, body) = send!(app, get(BASE, 3));
        assert_eq!(body["data"], json!([]));
    }

    #[actix_web::test]
    async fn foreign_callers_cannot_update_or_delete() {
        let app = test_app!();
        let created = create_as!(app, 1);
        let uri = format!("{BASE}/{}", created["id"]);

        let (status, _) = send!(
            app,
            as_user(test::TestRequest::put().uri(&uri), 2).set_json(json!({"title": "Mine now"}))
        );
        assert_eq!(status, StatusCode::FORBIDDEN);

        let (status, _) = send!(app, as_user(test::TestRequest::delete().uri(&uri), 2));
        assert_eq!(status, StatusCode::FORBIDDEN);

        let (status, body) = send!(app, get(&uri, 1));
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"], created);
    }

    #[actix_web::test]
    async fn update_can_clear_notes_and_repeat_values() {
        let app = test_app!();
        let mut body = example_body();
        body["notes"] = json!("first round");
        let (_, created) = send!(
            app,
            as_user(test::TestRequest::post().uri(BASE), 1).set_json(body)
        );
        let created = created["data"].clone();
        let uri = format!("{BASE}/{}", created["id"]);

        let (status, body) = send!(
            app,
            as_user(test::TestRequest::put().uri(&uri), 1)
                .set_json(json!({"title": "Eng", "company": "Acme"}))
        );
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"], created);

        let (_, body) = send!(
            app,
            as_user(test::TestRequest::patch().uri(&uri), 1).set_json(json!({"notes": null}))
        );
        assert_eq!(body["data"]["notes"], Value::Null);
        assert_eq!(body["data"]["title"], "Eng");
    }

    #[actix_web::test]
    async fn delete_removes_the_record() {
        let app = test_app!();
        let created = create_as!(app, 1);
        let uri = format!("{BASE}/{}", created["id"]);

        let (status, body) = send!(app, as_user(test::TestRequest::delete().uri(&uri), 1));
        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            body,
            json!({"status": "success", "message": "Job application deleted successfully", "data": null})
        );

        let (status, _) = send!(app, get(&uri, 1));
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (_, body) = send!(app, get(BASE, 1));
        assert_eq!(body["data"], json!([]));

        let (status, _) = send!(app, as_user(test::TestRequest::delete().uri(&uri), 1));
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[actix_web::test]
    async fn unknown_and_malformed_ids_are_404() {
        let app = test_app!();
        for uri in [format!("{BASE}/404"), format!("{BASE}/abc")] {
            let (status, body) = send!(app, get(&uri, 1));
            assert_eq!(status, StatusCode::NOT_FOUND);
            assert_eq!(body["message"], "Job application not found");
        }

        let (status, _) = send!(
            app,
            as_user(test::TestRequest::patch().uri(&format!("{BASE}/404")), 1).set_json(json!({}))
        );
        assert_eq!(status, StatusCode::NOT_FOUND);

        // the record is resolved before the update rules run
        let (status, body) = send!(
            app,
            as_user(test::TestRequest::patch().uri(&format!("{BASE}/999")), 1)
                .set_json(json!({"status": "ghosted", "title": null}))
        );
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["message"], "Job application not found");
    }

    /// Store whose deletes never remove anything
    struct StuckStore(MemoryJobApplicationStore);

    #[async_trait]
    impl JobApplicationStore for StuckStore {
        async fn insert(&self, new: NewJobApplication) -> Result<JobApplication, StoreError> {
            self.0.insert(new).await
        }

        async fn find(&self, id: JobApplicationId) -> Result<Option<JobApplication>, StoreError> {
            self.0.find(id).await
        }

        async fn list_by_owner(&self, user_id: UserId) -> Result<Vec<JobApplication>, StoreError> {
            self.0.list_by_owner(user_id).await
        }

        async fn update(
            &self,
            id: JobApplicationId,
            changes: JobApplicationChanges,
        ) -> Result<Option<JobApplication>, StoreError> {
            self.0.update(id, changes).await
        }

        async fn delete(&self, _id: JobApplicationId) -> Result<bool, StoreError> {
            Ok(false)
        }

        async fn ping(&self) -> Result<(), StoreError> {
            Ok(())
        }
    }

    #[actix_web::test]
    async fn failed_delete_is_reported_not_hidden() {
        let app = test_app!(StuckStore(MemoryJobApplicationStore::new()));
        let created = create_as!(app, 1);
        let uri = format!("{BASE}/{}", created["id"]);

        let (status, body) = send!(app, as_user(test::TestRequest::delete().uri(&uri), 1));
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["status"], "error");
        assert_eq!(body["message"], "Failed to delete job application");

        let (status, _) = send!(app, get(&uri, 1));
        assert_eq!(status, StatusCode::OK);
    }
}
