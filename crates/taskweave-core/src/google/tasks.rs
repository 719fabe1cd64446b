//! Google Tasks v1 client implementing [`TaskStore`].

use std::sync::Arc;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::{path_segment, GoogleApi};
use crate::error::StoreError;
use crate::http::HttpRuntime;
use crate::model::{NewTask, Task, TaskList, TaskPatch};
use crate::ports::{CredentialSource, TaskStore};
use crate::storage::TasksConfig;

const SERVICE: &str = "Google Tasks";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Page<T> {
    #[serde(default = "Vec::new")]
    items: Vec<T>,
    #[serde(default)]
    next_page_token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct WireTaskList {
    id: String,
    #[serde(default)]
    title: String,
}

#[derive(Debug, Deserialize)]
struct WireTask {
    id: String,
    #[serde(default)]
    title: String,
    #[serde(default)]
    notes: Option<String>,
    /// RFC 3339, but only the date part is meaningful.
    #[serde(default)]
    due: Option<String>,
}

#[derive(Debug, Serialize)]
struct WireTaskBody<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    title: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    notes: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    due: Option<String>,
}

fn parse_due(raw: &str) -> Option<NaiveDate> {
    raw.get(..10)
        .and_then(|date| NaiveDate::parse_from_str(date, "%Y-%m-%d").ok())
}

fn format_due(date: NaiveDate) -> String {
    format!("{}T00:00:00.000Z", date.format("%Y-%m-%d"))
}

impl WireTask {
    fn into_task(self, list_id: &str) -> Task {
        Task {
            due: self.due.as_deref().and_then(parse_due),
            id: self.id,
            list_id: list_id.to_string(),
            title: self.title,
            notes: self.notes.unwrap_or_default(),
        }
    }
}

/// Google Tasks REST client.
pub struct GoogleTasksClient {
    api: GoogleApi,
    base: String,
}

impl GoogleTasksClient {
    pub fn new(
        http: Arc<HttpRuntime>,
        credentials: Arc<dyn CredentialSource>,
        config: &TasksConfig,
    ) -> Self {
        Self {
            api: GoogleApi::new(SERVICE, http, credentials),
            base: config.api_base.trim_end_matches('/').to_string(),
        }
    }

    fn tasks_url(&self, list_id: &str) -> String {
        format!("{}/lists/{}/tasks", self.base, path_segment(list_id))
    }

    fn task_url(&self, list_id: &str, task_id: &str) -> String {
        format!("{}/{}", self.tasks_url(list_id), path_segment(task_id))
    }
}

impl TaskStore for GoogleTasksClient {
    fn list_task_lists(&self) -> Result<Vec<TaskList>, StoreError> {
        let url = format!("{}/users/@me/lists", self.base);
        let mut lists = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let mut request = self.api.client().get(&url).query(&[("maxResults", "100")]);
            if let Some(ref token) = page_token {
                request = request.query(&[("pageToken", token.as_str())]);
            }
            let page: Page<WireTaskList> = self.api.send(request)?;
            lists.extend(page.items.into_iter().map(|l| TaskList {
                id: l.id,
                title: l.title,
            }));

            match page.next_page_token {
                Some(token) => page_token = Some(token),
                None => break,
            }
        }

        Ok(lists)
    }

    fn list_open_tasks(&self, list_id: &str) -> Result<Vec<Task>, StoreError> {
        let url = self.tasks_url(list_id);
        let mut tasks = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let mut request = self.api.client().get(&url).query(&[
                ("showCompleted", "false"),
                ("showHidden", "false"),
                ("maxResults", "100"),
            ]);
            if let Some(ref token) = page_token {
                request = request.query(&[("pageToken", token.as_str())]);
            }
            let page: Page<WireTask> = self.api.send(request)?;
            tasks.extend(page.items.into_iter().map(|t| t.into_task(list_id)));

            match page.next_page_token {
                Some(token) => page_token = Some(token),
                None => break,
            }
        }

        Ok(tasks)
    }

    fn create_task(&self, list_id: &str, task: &NewTask) -> Result<Task, StoreError> {
        let body = WireTaskBody {
            title: Some(&task.title),
            notes: (!task.notes.is_empty()).then_some(task.notes.as_str()),
            due: task.due.map(format_due),
        };
        let request = self.api.client().post(self.tasks_url(list_id)).json(&body);
        let created: WireTask = self.api.send(request)?;
        Ok(created.into_task(list_id))
    }

    fn update_task(
        &self,
        list_id: &str,
        task_id: &str,
        patch: &TaskPatch,
    ) -> Result<Task, StoreError> {
        let body = WireTaskBody {
            title: patch.title.as_deref(),
            notes: patch.notes.as_deref(),
            due: None,
        };
        let request = self
            .api
            .client()
            .patch(self.task_url(list_id, task_id))
            .json(&body);
        let updated: WireTask = self.api.send(request)?;
        Ok(updated.into_task(list_id))
    }

    fn delete_task(&self, list_id: &str, task_id: &str) -> Result<(), StoreError> {
        let request = self.api.client().delete(self.task_url(list_id, task_id));
        self.api.send_empty(request)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::StaticToken;
    use mockito::Matcher;
    use std::time::Duration;

    fn client_for(server: &mockito::ServerGuard) -> GoogleTasksClient {
        let config = TasksConfig {
            api_base: server.url(),
        };
        GoogleTasksClient::new(
            HttpRuntime::new(Duration::from_secs(5)).unwrap(),
            Arc::new(StaticToken("tok".into())),
            &config,
        )
    }

    #[test]
    fn due_dates_keep_only_the_date() {
        assert_eq!(
            parse_due("2024-03-05T00:00:00.000Z"),
            NaiveDate::from_ymd_opt(2024, 3, 5)
        );
        assert_eq!(parse_due("garbage"), None);
        assert_eq!(
            format_due(NaiveDate::from_ymd_opt(2024, 3, 5).unwrap()),
            "2024-03-05T00:00:00.000Z"
        );
    }

    #[test]
    fn list_task_lists_follows_pages() {
        let mut server = mockito::Server::new();
        let first = server
            .mock("GET", "/users/@me/lists")
            .match_header("authorization", "Bearer tok")
            .match_query(Matcher::Regex("^maxResults=100$".into()))
            .with_body(r#"{"items": [{"id": "l1", "title": "■メモ"}], "nextPageToken": "p2"}"#)
            .create();
        let second = server
            .mock("GET", "/users/@me/lists")
            .match_query(Matcher::UrlEncoded("pageToken".into(), "p2".into()))
            .with_body(r#"{"items": [{"id": "l2", "title": "■Work"}]}"#)
            .create();

        let lists = client_for(&server).list_task_lists().unwrap();

        let titles: Vec<_> = lists.iter().map(|l| l.title.as_str()).collect();
        assert_eq!(titles, vec!["■メモ", "■Work"]);
        first.assert();
        second.assert();
    }

    #[test]
    fn list_open_tasks_maps_fields() {
        let mut server = mockito::Server::new();
        server
            .mock("GET", "/lists/l1/tasks")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("showCompleted".into(), "false".into()),
                Matcher::UrlEncoded("showHidden".into(), "false".into()),
            ]))
            .with_body(
                r#"{"items": [
                    {"id": "t1", "title": "Report", "notes": "draft", "due": "2024-03-05T00:00:00.000Z", "status": "needsAction"},
                    {"id": "t2", "title": "Call"}
                ]}"#,
            )
            .create();

        let tasks = client_for(&server).list_open_tasks("l1").unwrap();

        assert_eq!(tasks.len(), 2);
        assert_eq!(tasks[0].list_id, "l1");
        assert_eq!(tasks[0].notes, "draft");
        assert_eq!(tasks[0].due, NaiveDate::from_ymd_opt(2024, 3, 5));
        assert_eq!(tasks[1].notes, "");
        assert_eq!(tasks[1].due, None);
    }

    #[test]
    fn create_task_posts_title_and_notes() {
        let mut server = mockito::Server::new();
        let mock = server
            .mock("POST", "/lists/l1/tasks")
            .match_body(Matcher::Json(serde_json::json!({
                "title": "【予定済】Standup",
                "notes": "From Calendar Event\n[Ref:EventID:e1]"
            })))
            .with_body(r#"{"id": "t9", "title": "【予定済】Standup", "notes": "From Calendar Event\n[Ref:EventID:e1]"}"#)
            .create();

        let task = client_for(&server)
            .create_task(
                "l1",
                &NewTask {
                    title: "【予定済】Standup".into(),
                    notes: "From Calendar Event\n[Ref:EventID:e1]".into(),
                    due: None,
                },
            )
            .unwrap();

        assert_eq!(task.id, "t9");
        mock.assert();
    }

    #[test]
    fn update_task_patches_only_given_fields() {
        let mut server = mockito::Server::new();
        let mock = server
            .mock("PATCH", "/lists/l1/tasks/t1")
            .match_body(Matcher::Json(serde_json::json!({"title": "new"})))
            .with_body(r#"{"id": "t1", "title": "new"}"#)
            .create();

        client_for(&server)
            .update_task(
                "l1",
                "t1",
                &TaskPatch {
                    title: Some("new".into()),
                    notes: None,
                },
            )
            .unwrap();
        mock.assert();
    }

    #[test]
    fn delete_and_api_errors() {
        let mut server = mockito::Server::new();
        server
            .mock("DELETE", "/lists/l1/tasks/t1")
            .with_status(204)
            .create();
        server
            .mock("DELETE", "/lists/l1/tasks/t2")
            .with_status(404)
            .with_body(r#"{"error": {"code": 404, "message": "Task not found"}}"#)
            .create();

        let client = client_for(&server);
        client.delete_task("l1", "t1").unwrap();

        let err = client.delete_task("l1", "t2").unwrap_err();
        assert!(matches!(err, StoreError::Api { status: 404, .. }));
        assert!(err.to_string().contains("Task not found"));
    }
}
