//! Repository listing and management for the authenticated account

use std::fmt;

use crate::error::map_api_error;
use crate::{Error, GitHubClient, Result};
use ghws_core::WorkItem;
use octocrab::models;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{debug, info};

/// Repositories fetched per API page
const PER_PAGE: u8 = 100;

/// Longest repository name GitHub accepts
const MAX_NAME_LEN: usize = 100;

/// Repository visibility
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    Public,
    Private,
}

impl Visibility {
    pub fn from_private(private: bool) -> Self {
        if private {
            Visibility::Private
        } else {
            Visibility::Public
        }
    }

    pub fn is_private(self) -> bool {
        self == Visibility::Private
    }
}

impl fmt::Display for Visibility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Visibility::Public => f.write_str("public"),
            Visibility::Private => f.write_str("private"),
        }
    }
}

/// A repository on GitHub
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RemoteRepository {
    /// `owner/name`
    pub full_name: String,
    pub name: String,
    pub owner: String,
    pub description: Option<String>,
    pub visibility: Visibility,
    /// Plain https clone URL (no credential)
    pub clone_url: String,
    pub default_branch: Option<String>,
}

impl From<&RemoteRepository> for WorkItem {
    fn from(repo: &RemoteRepository) -> Self {
        WorkItem::remote(repo.name.clone(), repo.clone_url.clone())
    }
}

impl From<models::Repository> for RemoteRepository {
    fn from(repo: models::Repository) -> Self {
        let login = repo.owner.map(|owner| owner.login);
        let full_name = match (repo.full_name, &login) {
            (Some(full_name), _) => full_name,
            (None, Some(login)) => format!("{}/{}", login, repo.name),
            (None, None) => repo.name.clone(),
        };
        let owner = login.unwrap_or_else(|| {
            full_name
                .split_once('/')
                .map(|(owner, _)| owner.to_string())
                .unwrap_or_default()
        });
        let clone_url = repo
            .clone_url
            .map(|url| url.to_string())
            .unwrap_or_else(|| format!("https://github.com/{}.git", full_name));

        RemoteRepository {
            full_name,
            name: repo.name,
            owner,
            description: repo.description.filter(|d| !d.is_empty()),
            visibility: Visibility::from_private(repo.private.unwrap_or(false)),
            clone_url,
            default_branch: repo.default_branch,
        }
    }
}

/// Page that follows `page` given how many items it held, if any
fn next_page_after(page: u32, len: usize) -> Option<u32> {
    if len < usize::from(PER_PAGE) {
        None
    } else {
        page.checked_add(1)
    }
}

/// Lazy listing of one owner's repositories, fetched a page at a time
///
/// Nothing is requested until [`RepoPages::next_page`] is awaited. A failed
/// page is retried by the next call. Each [`GitHubClient::repo_pages`] call
/// starts a fresh listing from the first page.
#[derive(Debug)]
pub struct RepoPages<'a> {
    client: &'a GitHubClient,
    owner: String,
    next: Option<u32>,
}

impl RepoPages<'_> {
    /// Fetch the next page, or `None` once the listing is exhausted
    pub async fn next_page(&mut self) -> Result<Option<Vec<RemoteRepository>>> {
        let Some(page) = self.next else {
            return Ok(None);
        };
        let items = self.client.list_repos_page(&self.owner, page).await?;
        self.next = next_page_after(page, items.len());
        if items.is_empty() {
            return Ok(None);
        }
        Ok(Some(items))
    }
}

/// Check a repository name before sending it to the API
///
/// GitHub allows ASCII letters, digits, `-`, `_` and `.`, up to 100 characters.
pub fn validate_repo_name(name: &str) -> Result<()> {
    if name.is_empty() {
        return Err(Error::Validation("Repository name is required".to_string()));
    }
    if name == "." || name == ".." {
        return Err(Error::Validation(format!("Repository name '{}' is reserved", name)));
    }
    if name.len() > MAX_NAME_LEN {
        return Err(Error::Validation(format!(
            "Repository name is longer than {} characters",
            MAX_NAME_LEN
        )));
    }
    if let Some(bad) = name
        .chars()
        .find(|c| !(c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.')))
    {
        return Err(Error::Validation(format!(
            "Repository name '{}' contains disallowed character {:?}",
            name, bad
        )));
    }
    Ok(())
}

impl GitHubClient {
    /// Fetch one page (1-based) of `owner`'s repositories
    ///
    /// For the authenticated login this includes private repositories.
    pub async fn list_repos_page(&self, owner: &str, page: u32) -> Result<Vec<RemoteRepository>> {
        debug!(owner, page, "Listing repositories");

        let repos: Vec<models::Repository> = if owner == self.login() {
            self.client()
                .current()
                .list_repos_for_authenticated_user()
                .affiliation("owner")
                .per_page(PER_PAGE)
                .page(page)
                .send()
                .await
                .map_err(|e| map_api_error(e, owner))?
                .items
        } else {
            let route = format!("/users/{}/repos?per_page={}&page={}", owner, PER_PAGE, page);
            self.client()
                .get(route, None::<&()>)
                .await
                .map_err(|e| map_api_error(e, owner))?
        };

        Ok(repos.into_iter().map(RemoteRepository::from).collect())
    }

    /// Start a lazy listing of `owner`'s repositories
    pub fn repo_pages(&self, owner: &str) -> RepoPages<'_> {
        RepoPages {
            client: self,
            owner: owner.to_string(),
            next: Some(1),
        }
    }

    /// List all of `owner`'s repositories, paging until the API runs out
    pub async fn list_repos(&self, owner: &str) -> Result<Vec<RemoteRepository>> {
        let mut pages = self.repo_pages(owner);
        let mut all = Vec::new();
        while let Some(items) = pages.next_page().await? {
            all.extend(items);
        }

        info!(owner, count = all.len(), "Fetched repositories");
        Ok(all)
    }

    /// List the authenticated user's own repositories
    pub async fn list_own_repos(&self) -> Result<Vec<RemoteRepository>> {
        let login = self.login().to_string();
        self.list_repos(&login).await
    }

    /// Fetch one of the authenticated user's repositories by name
    pub async fn find_repo(&self, name: &str) -> Result<RemoteRepository> {
        let full_name = format!("{}/{}", self.login(), name);
        debug!(repo = %full_name, "Fetching repository");

        let repo = self
            .client()
            .repos(self.login(), name)
            .get()
            .await
            .map_err(|e| map_api_error(e, &full_name))?;

        Ok(repo.into())
    }

    /// Create a repository for the authenticated user
    pub async fn create_repo(
        &self,
        name: &str,
        description: &str,
        visibility: Visibility,
    ) -> Result<RemoteRepository> {
        validate_repo_name(name)?;

        let body = json!({
            "name": name,
            "description": description,
            "private": visibility.is_private(),
        });
        let subject = format!("{}/{}", self.login(), name);

        let created: models::Repository = self
            .client()
            .post("/user/repos", Some(&body))
            .await
            .map_err(|e| map_api_error(e, &subject))?;

        let repo = RemoteRepository::from(created);
        info!(repo = %repo.full_name, visibility = %repo.visibility, "Created repository");
        Ok(repo)
    }

    /// Rename `repo` to `new_name`
    pub async fn rename_repo(&self, repo: &RemoteRepository, new_name: &str) -> Result<RemoteRepository> {
        validate_repo_name(new_name)?;
        let updated = self.edit_repo(repo, json!({ "name": new_name }), new_name).await?;
        info!(from = %repo.full_name, to = %updated.full_name, "Renamed repository");
        Ok(updated)
    }

    /// Make `repo` private or public
    pub async fn set_visibility(
        &self,
        repo: &RemoteRepository,
        visibility: Visibility,
    ) -> Result<RemoteRepository> {
        let body = json!({ "private": visibility.is_private() });
        let updated = self.edit_repo(repo, body, &repo.full_name).await?;
        info!(repo = %updated.full_name, visibility = %updated.visibility, "Changed visibility");
        Ok(updated)
    }

    async fn edit_repo(
        &self,
        repo: &RemoteRepository,
        body: serde_json::Value,
        subject: &str,
    ) -> Result<RemoteRepository> {
        let updated: models::Repository = self
            .client()
            .patch(format!("/repos/{}", repo.full_name), Some(&body))
            .await
            .map_err(|e| match map_api_error(e, subject) {
                // a missing repository is reported under its current name
                Error::NotFound(_) => Error::NotFound(repo.full_name.clone()),
                other => other,
            })?;
        Ok(updated.into())
    }

    /// Delete `repo`. Irreversible; callers must confirm with the user first.
    pub async fn delete_repo(&self, repo: &RemoteRepository) -> Result<()> {
        self.client()
            .repos(&repo.owner, &repo.name)
            .delete()
            .await
            .map_err(|e| map_api_error(e, &repo.full_name))?;

        info!(repo = %repo.full_name, "Deleted repository");
        Ok(())
    }
}
