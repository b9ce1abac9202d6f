//! Mock platform service for testing
//!
//! These are test utilities - not all may be used in every test binary.

#![allow(dead_code)]

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use subflow::error::{Error, Result};
use subflow::platform::{PlatformResolver, PlatformService};
use subflow::types::{PlatformConfig, PullRequest};

/// Call record for `create_pr_with_options`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreatePrCall {
    pub head: String,
    pub base: String,
    pub title: String,
    pub body: Option<String>,
    pub draft: bool,
}

/// Call record for `update_pr_body`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateBodyCall {
    pub pr_number: u64,
    pub body: String,
}

/// Simple mock platform service for testing
///
/// Features:
/// - Auto-incrementing PR numbers
/// - Created PRs are returned by later `find_existing_pr` calls
/// - Call tracking for verification
/// - Configurable responses per branch
/// - Error injection for failure path testing
pub struct MockPlatformService {
    config: PlatformConfig,
    next_pr_number: AtomicU64,
    find_pr_responses: Mutex<HashMap<String, Option<PullRequest>>>,
    // Call tracking
    find_pr_calls: Mutex<Vec<String>>,
    create_pr_calls: Mutex<Vec<CreatePrCall>>,
    update_body_calls: Mutex<Vec<UpdateBodyCall>>,
    // Error injection
    error_on_find_pr: Mutex<Option<String>>,
    error_on_create_pr: Mutex<Option<String>>,
    error_on_current_user: Mutex<Option<String>>,
}

impl MockPlatformService {
    /// Create a new mock with the given config
    pub fn with_config(config: PlatformConfig) -> Self {
        Self {
            config,
            next_pr_number: AtomicU64::new(1),
            find_pr_responses: Mutex::new(HashMap::new()),
            find_pr_calls: Mutex::new(Vec::new()),
            create_pr_calls: Mutex::new(Vec::new()),
            update_body_calls: Mutex::new(Vec::new()),
            error_on_find_pr: Mutex::new(None),
            error_on_create_pr: Mutex::new(None),
            error_on_current_user: Mutex::new(None),
        }
    }

    // === Error injection methods ===

    /// Make `find_existing_pr` return an error
    pub fn fail_find_pr(&self, msg: &str) {
        *self.error_on_find_pr.lock().unwrap() = Some(msg.to_string());
    }

    /// Make `create_pr_with_options` return an error
    pub fn fail_create_pr(&self, msg: &str) {
        *self.error_on_create_pr.lock().unwrap() = Some(msg.to_string());
    }

    /// Make `current_user` fail as if the token were rejected
    pub fn reject_credentials(&self, msg: &str) {
        *self.error_on_current_user.lock().unwrap() = Some(msg.to_string());
    }

    /// Let `create_pr_with_options` succeed again
    pub fn recover_create_pr(&self) {
        *self.error_on_create_pr.lock().unwrap() = None;
    }

    /// Set the response for `find_existing_pr` for a specific branch
    pub fn set_find_pr_response(&self, branch: &str, pr: Option<PullRequest>) {
        self.find_pr_responses
            .lock()
            .unwrap()
            .insert(branch.to_string(), pr);
    }

    // === Call verification methods ===

    /// Get all branches that `find_existing_pr` was called with
    pub fn get_find_pr_calls(&self) -> Vec<String> {
        self.find_pr_calls.lock().unwrap().clone()
    }

    /// Get all `create_pr_with_options` calls
    pub fn get_create_pr_calls(&self) -> Vec<CreatePrCall> {
        self.create_pr_calls.lock().unwrap().clone()
    }

    /// Get all `update_pr_body` calls
    pub fn get_update_body_calls(&self) -> Vec<UpdateBodyCall> {
        self.update_body_calls.lock().unwrap().clone()
    }

    /// Assert that `create_pr_with_options` was called with specific head and base
    pub fn assert_create_pr_called(&self, head: &str, base: &str) {
        let calls = self.get_create_pr_calls();
        assert!(
            calls.iter().any(|c| c.head == head && c.base == base),
            "Expected create_pr({head}, {base}) but got: {calls:?}"
        );
    }

    /// Assert that no PR was created
    pub fn assert_no_pr_created(&self) {
        let calls = self.get_create_pr_calls();
        assert!(calls.is_empty(), "Expected no create_pr calls but got: {calls:?}");
    }

    /// Assert that `find_existing_pr` was called for each branch
    pub fn assert_find_pr_called_for(&self, branches: &[&str]) {
        let calls = self.get_find_pr_calls();
        for branch in branches {
            assert!(
                calls.contains(&branch.to_string()),
                "Expected find_existing_pr({branch}) but got: {calls:?}"
            );
        }
    }
}

#[async_trait]
impl PlatformService for MockPlatformService {
    async fn find_existing_pr(&self, head_branch: &str) -> Result<Option<PullRequest>> {
        self.find_pr_calls
            .lock()
            .unwrap()
            .push(head_branch.to_string());

        // Check for injected error
        if let Some(msg) = self.error_on_find_pr.lock().unwrap().as_ref() {
            return Err(Error::Platform(msg.clone()));
        }

        let responses = self.find_pr_responses.lock().unwrap();
        Ok(responses.get(head_branch).cloned().flatten())
    }

    async fn create_pr_with_options(
        &self,
        head: &str,
        base: &str,
        title: &str,
        body: Option<&str>,
        draft: bool,
    ) -> Result<PullRequest> {
        self.create_pr_calls.lock().unwrap().push(CreatePrCall {
            head: head.to_string(),
            base: base.to_string(),
            title: title.to_string(),
            body: body.map(ToString::to_string),
            draft,
        });

        if let Some(msg) = self.error_on_create_pr.lock().unwrap().as_ref() {
            return Err(Error::Platform(msg.clone()));
        }

        let number = self.next_pr_number.fetch_add(1, Ordering::SeqCst);
        let pr = PullRequest {
            number,
            html_url: format!(
                "https://github.com/{}/{}/pull/{number}",
                self.config.owner, self.config.repo
            ),
            base_ref: base.to_string(),
            head_ref: head.to_string(),
            title: title.to_string(),
            is_draft: draft,
        };
        self.set_find_pr_response(head, Some(pr.clone()));
        Ok(pr)
    }

    async fn update_pr_body(&self, pr_number: u64, body: &str) -> Result<PullRequest> {
        self.update_body_calls.lock().unwrap().push(UpdateBodyCall {
            pr_number,
            body: body.to_string(),
        });

        let responses = self.find_pr_responses.lock().unwrap();
        responses
            .values()
            .flatten()
            .find(|pr| pr.number == pr_number)
            .cloned()
            .ok_or_else(|| Error::Platform(format!("no PR #{pr_number}")))
    }

    async fn get_pr(&self, pr_number: u64) -> Result<PullRequest> {
        let responses = self.find_pr_responses.lock().unwrap();
        responses
            .values()
            .flatten()
            .find(|pr| pr.number == pr_number)
            .cloned()
            .ok_or_else(|| Error::Platform(format!("no PR #{pr_number}")))
    }

    async fn current_user(&self) -> Result<String> {
        match self.error_on_current_user.lock().unwrap().as_ref() {
            Some(msg) => Err(Error::Platform(msg.clone())),
            None => Ok("mock-user".to_string()),
        }
    }

    fn config(&self) -> &PlatformConfig {
        &self.config
    }
}

/// A mock shared between the test and the code under test
pub struct SharedPlatform(pub Arc<MockPlatformService>);

#[async_trait]
impl PlatformService for SharedPlatform {
    async fn find_existing_pr(&self, head_branch: &str) -> Result<Option<PullRequest>> {
        self.0.find_existing_pr(head_branch).await
    }

    async fn create_pr_with_options(
        &self,
        head: &str,
        base: &str,
        title: &str,
        body: Option<&str>,
        draft: bool,
    ) -> Result<PullRequest> {
        self.0
            .create_pr_with_options(head, base, title, body, draft)
            .await
    }

    async fn update_pr_body(&self, pr_number: u64, body: &str) -> Result<PullRequest> {
        self.0.update_pr_body(pr_number, body).await
    }

    async fn get_pr(&self, pr_number: u64) -> Result<PullRequest> {
        self.0.get_pr(pr_number).await
    }

    async fn current_user(&self) -> Result<String> {
        self.0.current_user().await
    }

    fn config(&self) -> &PlatformConfig {
        self.0.config()
    }
}

/// Resolver handing out registered mocks by remote URL
///
/// Unregistered URLs fail like an unsupported remote would.
#[derive(Default)]
pub struct MockResolver {
    services: Mutex<HashMap<String, Arc<MockPlatformService>>>,
    calls: Mutex<Vec<String>>,
}

impl MockResolver {
    /// Register a mock for a remote URL
    pub fn register(&self, url: &str, service: Arc<MockPlatformService>) {
        self.services
            .lock()
            .unwrap()
            .insert(url.to_string(), service);
    }

    /// URLs that were resolved
    pub fn get_calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl PlatformResolver for MockResolver {
    async fn service_for_url(&self, remote_url: &str) -> Result<Box<dyn PlatformService>> {
        self.calls.lock().unwrap().push(remote_url.to_string());
        let service = self.services.lock().unwrap().get(remote_url).cloned();
        match service {
            Some(service) => Ok(Box::new(SharedPlatform(service))),
            None => Err(Error::UnsupportedRemote(remote_url.to_string())),
        }
    }
}
