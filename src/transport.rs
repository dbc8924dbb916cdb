//! The network mirror.
//!
//! Local storage is authoritative. A [`Transport`] is told about each write
//! after it has been persisted, and failures here never undo a local change.

use std::{
    collections::{HashMap, HashSet},
    time::Duration,
};

use chrono::{DateTime, Utc};
use reqwest::blocking::{Client, Response};
use serde::Serialize;

use crate::{
    domain::{Difficulty, Recipe, RecipeId},
    storage::{
        format::{decode_records, StoredRecipe},
        ParseError,
    },
    Config,
};

/// A remote copy of the recipe collection.
///
/// The store calls a transport from a background thread.
pub trait Transport: Send + Sync {
    /// Fetches the remote collection.
    ///
    /// # Errors
    ///
    /// Returns an error if the remote is unreachable or the response is malformed.
    fn list(&self) -> Result<Vec<Recipe>, TransportError>;

    /// Announces a newly created recipe.
    ///
    /// # Errors
    ///
    /// Returns an error if the remote is unreachable or rejects the request.
    fn create(&self, recipe: &Recipe) -> Result<(), TransportError>;

    /// Announces a revised recipe.
    ///
    /// # Errors
    ///
    /// Returns an error if the remote is unreachable or rejects the request.
    fn update(&self, recipe: &Recipe) -> Result<(), TransportError>;

    /// Announces a deleted recipe.
    ///
    /// # Errors
    ///
    /// Returns an error if the remote is unreachable or rejects the request.
    fn delete(&self, id: RecipeId) -> Result<(), TransportError>;
}

/// Errors talking to the remote.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// The request could not be sent or the response could not be read.
    #[error("remote request failed: {0}")]
    Http(#[from] reqwest::Error),
    /// The remote answered with a non-success status.
    #[error("remote rejected request with status {0}")]
    Rejected(u16),
    /// The remote collection violates a collection invariant.
    #[error("remote returned invalid recipes: {0}")]
    Decode(#[from] ParseError),
}

/// A [`Transport`] speaking JSON over HTTP.
///
/// Routes, relative to the base URL:
///
/// | operation | route                 |
/// |-----------|-----------------------|
/// | list      | `GET /recipes`        |
/// | create    | `POST /recipes`       |
/// | update    | `PUT /recipes/{id}`   |
/// | delete    | `DELETE /recipes/{id}`|
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
    base_url: String,
}

impl HttpTransport {
    /// A transport for the service at `base_url`.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be initialised.
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, TransportError> {
        let client = Client::builder().timeout(timeout).build()?;
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Ok(Self { client, base_url })
    }

    /// The transport configured in `config`, if a remote is set.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be initialised.
    pub fn from_config(config: &Config) -> Result<Option<Self>, TransportError> {
        config
            .remote
            .as_deref()
            .map(|url| Self::new(url, config.remote_timeout()))
            .transpose()
    }

    /// The base URL requests are sent to.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn collection_url(&self) -> String {
        format!("{}/recipes", self.base_url)
    }

    fn record_url(&self, id: RecipeId) -> String {
        format!("{}/recipes/{id}", self.base_url)
    }
}

fn accepted(response: Response) -> Result<Response, TransportError> {
    let status = response.status();
    if status.is_success() {
        Ok(response)
    } else {
        Err(TransportError::Rejected(status.as_u16()))
    }
}

impl Transport for HttpTransport {
    fn list(&self) -> Result<Vec<Recipe>, TransportError> {
        let response = accepted(self.client.get(self.collection_url()).send()?)?;
        let records: Vec<StoredRecipe> = response.json()?;
        Ok(decode_records(records)?)
    }

    fn create(&self, recipe: &Recipe) -> Result<(), TransportError> {
        let request = self.client.post(self.collection_url()).json(&Draft::from(recipe));
        accepted(request.send()?)?;
        Ok(())
    }

    fn update(&self, recipe: &Recipe) -> Result<(), TransportError> {
        let request = self
            .client
            .put(self.record_url(recipe.id()))
            .json(&StoredRecipe::from(recipe));
        accepted(request.send()?)?;
        Ok(())
    }

    fn delete(&self, id: RecipeId) -> Result<(), TransportError> {
        accepted(self.client.delete(self.record_url(id)).send()?)?;
        Ok(())
    }
}

/// A recipe body without its id, for creation.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct Draft<'a> {
    title: &'a str,
    description: &'a str,
    ingredients: &'a [String],
    steps: &'a [String],
    tags: &'a [String],
    difficulty: Difficulty,
    last_updated: DateTime<Utc>,
}

impl<'a> From<&'a Recipe> for Draft<'a> {
    fn from(recipe: &'a Recipe) -> Self {
        Self {
            title: recipe.title(),
            description: recipe.description(),
            ingredients: recipe.ingredients(),
            steps: recipe.steps(),
            tags: recipe.tags(),
            difficulty: recipe.difficulty(),
            last_updated: recipe.last_updated(),
        }
    }
}

/// How the local collection differs from the remote one.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RemoteDiff {
    /// Ids present locally but not remotely, in local order.
    pub only_local: Vec<RecipeId>,
    /// Ids present remotely but not locally, in remote order.
    pub only_remote: Vec<RecipeId>,
    /// Ids present on both sides whose content differs, in local order.
    pub differing: Vec<RecipeId>,
}

impl RemoteDiff {
    /// Compares two collections by id and content.
    ///
    /// Write timestamps are ignored; a remote may restamp on receipt.
    #[must_use]
    pub fn between(local: &[Recipe], remote: &[Recipe]) -> Self {
        let remote_by_id: HashMap<RecipeId, &Recipe> =
            remote.iter().map(|recipe| (recipe.id(), recipe)).collect();
        let local_ids: HashSet<RecipeId> = local.iter().map(Recipe::id).collect();

        let mut diff = Self::default();
        for recipe in local {
            match remote_by_id.get(&recipe.id()) {
                None => diff.only_local.push(recipe.id()),
                Some(theirs) if theirs.data() != recipe.data() => diff.differing.push(recipe.id()),
                Some(_) => {}
            }
        }
        diff.only_remote = remote
            .iter()
            .map(Recipe::id)
            .filter(|id| !local_ids.contains(id))
            .collect();
        diff
    }

    /// Whether both sides hold the same recipes.
    #[must_use]
    pub fn is_in_sync(&self) -> bool {
        self.only_local.is_empty() && self.only_remote.is_empty() && self.differing.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use std::{io::Read, net::TcpListener, thread};

    use tiny_http::{Response, Server};

    use super::*;
    use crate::{
        domain::recipe::fixtures::{data, recipe},
        storage::format::encode,
    };

    /// A request as seen by the server: method, url and body.
    type Seen = (String, String, String);

    /// Serves one canned `(status, body)` response per request, in order.
    fn serve(responses: Vec<(u16, String)>) -> (HttpTransport, thread::JoinHandle<Vec<Seen>>) {
        let server = Server::http("127.0.0.1:0").unwrap();
        let addr = server.server_addr().to_ip().unwrap();
        let handle = thread::spawn(move || {
            responses
                .into_iter()
                .map(|(status, body)| {
                    let mut request = server.recv().unwrap();
                    let mut content = String::new();
                    request.as_reader().read_to_string(&mut content).unwrap();
                    let seen = (
                        request.method().to_string(),
                        request.url().to_string(),
                        content,
                    );
                    request
                        .respond(Response::from_string(body).with_status_code(status))
                        .unwrap();
                    seen
                })
                .collect()
        });
        let transport = HttpTransport::new(format!("http://{addr}/"), Duration::from_secs(5)).unwrap();
        (transport, handle)
    }

    fn body(seen: &Seen) -> serde_json::Value {
        serde_json::from_str(&seen.2).unwrap()
    }

    #[test]
    fn list_decodes_the_remote_collection() {
        let soup = recipe("Soup", Difficulty::Easy, &["quick"], 0);
        let document: serde_json::Value =
            serde_json::from_slice(&encode(std::slice::from_ref(&soup)).unwrap()).unwrap();
        let records = document["recipes"].to_string();
        let (transport, server) = serve(vec![(200, records)]);

        let remote = transport.list().unwrap();

        assert_eq!(remote, [soup]);
        let seen = server.join().unwrap();
        assert_eq!((seen[0].0.as_str(), seen[0].1.as_str()), ("GET", "/recipes"));
    }

    #[test]
    fn create_posts_the_recipe_without_its_id() {
        let soup = recipe("Soup", Difficulty::Easy, &["quick"], 0);
        let (transport, server) = serve(vec![(201, String::new())]);

        transport.create(&soup).unwrap();

        let seen = server.join().unwrap();
        assert_eq!((seen[0].0.as_str(), seen[0].1.as_str()), ("POST", "/recipes"));
        let sent = body(&seen[0]);
        assert!(sent.get("id").is_none());
        assert_eq!(sent["title"], "Soup");
        assert_eq!(sent["lastUpdated"], "2024-05-01T12:00:00Z");
    }

    #[test]
    fn update_puts_the_full_recipe() {
        let soup = recipe("Soup", Difficulty::Hard, &[], 0);
        let (transport, server) = serve(vec![(200, String::new())]);

        transport.update(&soup).unwrap();

        let seen = server.join().unwrap();
        assert_eq!(seen[0].0, "PUT");
        assert_eq!(seen[0].1, format!("/recipes/{}", soup.id()));
        let sent = body(&seen[0]);
        assert_eq!(sent["id"], soup.id().to_string());
        assert_eq!(sent["difficulty"], "Hard");
    }

    #[test]
    fn delete_targets_the_record_route() {
        let id = RecipeId::new();
        let (transport, server) = serve(vec![(204, String::new())]);

        transport.delete(id).unwrap();

        let seen = server.join().unwrap();
        assert_eq!(seen[0].0, "DELETE");
        assert_eq!(seen[0].1, format!("/recipes/{id}"));
    }

    #[test]
    fn error_status_is_rejected() {
        let (transport, server) = serve(vec![(500, "boom".to_string())]);

        let error = transport.delete(RecipeId::new()).unwrap_err();

        assert!(matches!(error, TransportError::Rejected(500)));
        server.join().unwrap();
    }

    #[test]
    fn unreachable_remote_is_an_http_error() {
        let addr = {
            let listener = TcpListener::bind("127.0.0.1:0").unwrap();
            listener.local_addr().unwrap()
        };
        let transport = HttpTransport::new(format!("http://{addr}"), Duration::from_secs(1)).unwrap();

        let error = transport.list().unwrap_err();

        assert!(matches!(error, TransportError::Http(_)));
    }

    #[test]
    fn no_remote_configured_means_no_transport() {
        assert!(HttpTransport::from_config(&Config::default()).unwrap().is_none());
    }

    #[test]
    fn diff_classifies_ids() {
        let shared = recipe("Shared", Difficulty::Easy, &[], 0);
        let local_only = recipe("Local", Difficulty::Easy, &[], 1);
        let remote_only = recipe("Remote", Difficulty::Easy, &[], 2);
        let edited = recipe("Edited", Difficulty::Easy, &[], 3);
        let mut theirs = edited.clone();
        theirs.revise(data("Edited remotely", Difficulty::Hard, &[]), edited.last_updated());

        let diff = RemoteDiff::between(
            &[shared.clone(), local_only.clone(), edited.clone()],
            &[remote_only.clone(), theirs, shared],
        );

        assert_eq!(diff.only_local, [local_only.id()]);
        assert_eq!(diff.only_remote, [remote_only.id()]);
        assert_eq!(diff.differing, [edited.id()]);
        assert!(!diff.is_in_sync());
    }

    #[test]
    fn restamped_copies_are_in_sync() {
        let soup = recipe("Soup", Difficulty::Easy, &[], 0);
        let mut restamped = soup.clone();
        restamped.revise(soup.data().clone(), soup.last_updated() + chrono::Duration::minutes(5));

        assert!(RemoteDiff::between(&[soup], &[restamped]).is_in_sync());
    }
}
