use std::collections::{BTreeMap, HashMap, VecDeque};
use std::sync::atomic::{AtomicU64, Ordering};

use apipub_core::{
    ApiPage, ControlPlane, ControlPlaneError, RemoteApi, Stage, StageLookup, StageSpec,
};
use async_trait::async_trait;
use tokio::sync::RwLock;

const DEFAULT_PAGE_SIZE: usize = 100;

/// Control-plane operations, used to address recorded calls and faults.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    ListApis,
    ImportApi,
    ReimportApi,
    DeleteApi,
    GetStage,
    CreateStage,
    DeleteStage,
}

/// A recorded control-plane call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    ListApis { next_token: Option<String> },
    ImportApi,
    ReimportApi { api_id: String },
    DeleteApi { api_id: String },
    GetStage { api_id: String, stage_name: String },
    CreateStage { api_id: String, stage_name: String },
    DeleteStage { api_id: String, stage_name: String },
}

impl Call {
    pub fn operation(&self) -> Operation {
        match self {
            Self::ListApis { .. } => Operation::ListApis,
            Self::ImportApi => Operation::ImportApi,
            Self::ReimportApi { .. } => Operation::ReimportApi,
            Self::DeleteApi { .. } => Operation::DeleteApi,
            Self::GetStage { .. } => Operation::GetStage,
            Self::CreateStage { .. } => Operation::CreateStage,
            Self::DeleteStage { .. } => Operation::DeleteStage,
        }
    }

    /// Returns `true` for calls that change remote state.
    pub fn is_mutation(&self) -> bool {
        !matches!(self, Self::ListApis { .. } | Self::GetStage { .. })
    }
}

/// A failure to return from the next call of an operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Fault {
    NotFound,
    Validation(String),
    Remote(String),
}

impl Fault {
    fn into_error(self, operation: Operation, target: &str) -> ControlPlaneError {
        match self {
            Self::NotFound => ControlPlaneError::not_found(kind_of(operation), target),
            Self::Validation(message) => ControlPlaneError::validation(message),
            Self::Remote(message) => ControlPlaneError::remote(format!("{operation:?}"), message),
        }
    }
}

fn kind_of(operation: Operation) -> &'static str {
    match operation {
        Operation::GetStage | Operation::CreateStage | Operation::DeleteStage => "stage",
        _ => "api",
    }
}

#[derive(Debug)]
struct ApiRecord {
    api: RemoteApi,
    definition: String,
    stages: BTreeMap<String, Stage>,
}

#[derive(Debug, Default)]
struct State {
    apis: Vec<ApiRecord>,
    calls: Vec<Call>,
    faults: HashMap<Operation, VecDeque<Fault>>,
}

impl State {
    fn record(&mut self, call: Call) -> Option<Fault> {
        let operation = call.operation();
        self.calls.push(call);
        self.faults.get_mut(&operation).and_then(VecDeque::pop_front)
    }

    fn api_mut(&mut self, api_id: &str) -> Option<&mut ApiRecord> {
        self.apis.iter_mut().find(|r| r.api.api_id == api_id)
    }
}

/// Control plane kept entirely in memory.
///
/// APIs are listed in creation order. Names are not unique, matching the
/// remote service. The API name is taken from the definition's `info.title`
/// on import and reimport.
#[derive(Debug)]
pub struct InMemoryControlPlane {
    state: RwLock<State>,
    id_counter: AtomicU64,
    page_size: usize,
}

impl Default for InMemoryControlPlane {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryControlPlane {
    pub fn new() -> Self {
        Self {
            state: RwLock::new(State::default()),
            id_counter: AtomicU64::new(1),
            page_size: DEFAULT_PAGE_SIZE,
        }
    }

    /// Limits how many APIs a single `list_apis` page returns.
    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    fn next_id(&self) -> String {
        format!("api{:04}", self.id_counter.fetch_add(1, Ordering::SeqCst))
    }

    fn endpoint_for(api_id: &str) -> String {
        format!("https://{api_id}.execute-api.local")
    }

    /// Adds an existing API with a fixed id, bypassing call recording.
    pub async fn seed_api(&self, api_id: &str, name: &str) -> RemoteApi {
        let api = RemoteApi {
            api_id: api_id.to_string(),
            name: name.to_string(),
            api_endpoint: Self::endpoint_for(api_id),
        };
        self.state.write().await.apis.push(ApiRecord {
            api: api.clone(),
            definition: String::new(),
            stages: BTreeMap::new(),
        });
        api
    }

    /// Adds a stage to a seeded API, bypassing call recording.
    pub async fn seed_stage(&self, api_id: &str, spec: &StageSpec) {
        if let Some(record) = self.state.write().await.api_mut(api_id) {
            record.stages.insert(spec.stage_name.clone(), Stage::from(spec));
        }
    }

    /// Queues a fault for the next call of `operation`.
    pub async fn inject_fault(&self, operation: Operation, fault: Fault) {
        self.state
            .write()
            .await
            .faults
            .entry(operation)
            .or_default()
            .push_back(fault);
    }

    pub async fn apis(&self) -> Vec<RemoteApi> {
        self.state
            .read()
            .await
            .apis
            .iter()
            .map(|r| r.api.clone())
            .collect()
    }

    pub async fn definition(&self, api_id: &str) -> Option<String> {
        self.state
            .read()
            .await
            .apis
            .iter()
            .find(|r| r.api.api_id == api_id)
            .map(|r| r.definition.clone())
    }

    pub async fn stage(&self, api_id: &str, stage_name: &str) -> Option<Stage> {
        self.state
            .read()
            .await
            .apis
            .iter()
            .find(|r| r.api.api_id == api_id)
            .and_then(|r| r.stages.get(stage_name).cloned())
    }

    pub async fn stage_count(&self, api_id: &str) -> usize {
        self.state
            .read()
            .await
            .apis
            .iter()
            .find(|r| r.api.api_id == api_id)
            .map_or(0, |r| r.stages.len())
    }

    pub async fn calls(&self) -> Vec<Call> {
        self.state.read().await.calls.clone()
    }

    pub async fn count(&self, operation: Operation) -> usize {
        self.state
            .read()
            .await
            .calls
            .iter()
            .filter(|c| c.operation() == operation)
            .count()
    }
}

/// Checks a definition the way the remote service would and extracts the
/// API name from `info.title`.
fn validate_definition(definition: &str) -> Result<String, ControlPlaneError> {
    let document: serde_yaml::Value = serde_yaml::from_str(definition)
        .map_err(|e| ControlPlaneError::validation(format!("Unable to parse definition: {e}")))?;

    document
        .get("info")
        .and_then(|info| info.get("title"))
        .and_then(serde_yaml::Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| ControlPlaneError::validation("Definition is missing info.title"))
}

#[async_trait]
impl ControlPlane for InMemoryControlPlane {
    async fn list_apis(&self, next_token: Option<&str>) -> Result<ApiPage, ControlPlaneError> {
        let mut state = self.state.write().await;
        if let Some(fault) = state.record(Call::ListApis {
            next_token: next_token.map(str::to_string),
        }) {
            return Err(fault.into_error(Operation::ListApis, "apis"));
        }

        let offset = match next_token {
            Some(token) => token.parse::<usize>().map_err(|_| {
                ControlPlaneError::remote("ListApis", format!("invalid nextToken {token:?}"))
            })?,
            None => 0,
        };

        let items: Vec<RemoteApi> = state
            .apis
            .iter()
            .skip(offset)
            .take(self.page_size)
            .map(|r| r.api.clone())
            .collect();
        let consumed = offset + items.len();
        let next_token = (consumed < state.apis.len()).then(|| consumed.to_string());

        Ok(ApiPage { items, next_token })
    }

    async fn import_api(
        &self,
        definition: &str,
        _fail_on_warnings: bool,
    ) -> Result<RemoteApi, ControlPlaneError> {
        let mut state = self.state.write().await;
        if let Some(fault) = state.record(Call::ImportApi) {
            return Err(fault.into_error(Operation::ImportApi, "new api"));
        }

        let name = validate_definition(definition)?;
        let api_id = self.next_id();
        let api = RemoteApi {
            api_endpoint: Self::endpoint_for(&api_id),
            api_id,
            name,
        };
        state.apis.push(ApiRecord {
            api: api.clone(),
            definition: definition.to_string(),
            stages: BTreeMap::new(),
        });

        tracing::debug!(api_id = %api.api_id, name = %api.name, "In-memory API imported");
        Ok(api)
    }

    async fn reimport_api(
        &self,
        api_id: &str,
        definition: &str,
        _fail_on_warnings: bool,
    ) -> Result<RemoteApi, ControlPlaneError> {
        let mut state = self.state.write().await;
        if let Some(fault) = state.record(Call::ReimportApi {
            api_id: api_id.to_string(),
        }) {
            return Err(fault.into_error(Operation::ReimportApi, api_id));
        }

        let name = validate_definition(definition)?;
        let record = state
            .api_mut(api_id)
            .ok_or_else(|| ControlPlaneError::not_found("api", api_id))?;
        record.api.name = name;
        record.definition = definition.to_string();
        Ok(record.api.clone())
    }

    async fn delete_api(&self, api_id: &str) -> Result<(), ControlPlaneError> {
        let mut state = self.state.write().await;
        if let Some(fault) = state.record(Call::DeleteApi {
            api_id: api_id.to_string(),
        }) {
            return Err(fault.into_error(Operation::DeleteApi, api_id));
        }

        let before = state.apis.len();
        state.apis.retain(|r| r.api.api_id != api_id);
        if state.apis.len() == before {
            return Err(ControlPlaneError::not_found("api", api_id));
        }
        Ok(())
    }

    async fn get_stage(
        &self,
        api_id: &str,
        stage_name: &str,
    ) -> Result<StageLookup, ControlPlaneError> {
        let mut state = self.state.write().await;
        if let Some(fault) = state.record(Call::GetStage {
            api_id: api_id.to_string(),
            stage_name: stage_name.to_string(),
        }) {
            return Err(fault.into_error(Operation::GetStage, stage_name));
        }

        Ok(state
            .api_mut(api_id)
            .and_then(|r| r.stages.get(stage_name).cloned())
            .map_or(StageLookup::Absent, StageLookup::Found))
    }

    async fn create_stage(
        &self,
        api_id: &str,
        spec: &StageSpec,
    ) -> Result<Stage, ControlPlaneError> {
        let mut state = self.state.write().await;
        if let Some(fault) = state.record(Call::CreateStage {
            api_id: api_id.to_string(),
            stage_name: spec.stage_name.clone(),
        }) {
            return Err(fault.into_error(Operation::CreateStage, &spec.stage_name));
        }

        let record = state
            .api_mut(api_id)
            .ok_or_else(|| ControlPlaneError::not_found("api", api_id))?;
        if record.stages.contains_key(&spec.stage_name) {
            return Err(ControlPlaneError::remote(
                "CreateStage",
                format!("Stage {} already exists", spec.stage_name),
            ));
        }

        let stage = Stage::from(spec);
        record.stages.insert(spec.stage_name.clone(), stage.clone());
        Ok(stage)
    }

    async fn delete_stage(&self, api_id: &str, stage_name: &str) -> Result<(), ControlPlaneError> {
        let mut state = self.state.write().await;
        if let Some(fault) = state.record(Call::DeleteStage {
            api_id: api_id.to_string(),
            stage_name: stage_name.to_string(),
        }) {
            return Err(fault.into_error(Operation::DeleteStage, stage_name));
        }

        state
            .api_mut(api_id)
            .and_then(|r| r.stages.remove(stage_name))
            .map(|_| ())
            .ok_or_else(|| ControlPlaneError::not_found("stage", format!("{api_id}/{stage_name}")))
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DEFINITION: &str = "openapi: 3.0.1\ninfo:\n  title: demo\n  version: '1.0'\n";

    #[tokio::test]
    async fn test_import_takes_name_from_title() {
        let cp = InMemoryControlPlane::new();
        let api = cp.import_api(DEFINITION, true).await.unwrap();

        assert_eq!(api.name, "demo");
        assert_eq!(api.api_id, "api0001");
        assert_eq!(api.api_endpoint, "https://api0001.execute-api.local");
        assert_eq!(cp.definition("api0001").await.as_deref(), Some(DEFINITION));
    }

    #[tokio::test]
    async fn test_import_rejects_unparseable_definition() {
        let cp = InMemoryControlPlane::new();
        let err = cp.import_api("info: [broken", true).await.unwrap_err();
        assert!(err.is_validation());
        assert!(cp.apis().await.is_empty());
    }

    #[tokio::test]
    async fn test_list_apis_pages() {
        let cp = InMemoryControlPlane::new().with_page_size(2);
        for (id, name) in [("a", "one"), ("b", "two"), ("c", "three")] {
            cp.seed_api(id, name).await;
        }

        let first = cp.list_apis(None).await.unwrap();
        assert_eq!(first.items.len(), 2);
        assert_eq!(first.next_token.as_deref(), Some("2"));

        let second = cp.list_apis(first.next_token.as_deref()).await.unwrap();
        assert_eq!(second.items.len(), 1);
        assert_eq!(second.items[0].api_id, "c");
        assert!(second.next_token.is_none());
    }

    #[tokio::test]
    async fn test_stage_lifecycle() {
        let cp = InMemoryControlPlane::new();
        cp.seed_api("abc123", "demo").await;
        let spec = apipub_core::DeploymentManager::stage_spec("s", "arn:logs", 1, 1);

        assert!(cp.get_stage("abc123", "s").await.unwrap().is_absent());
        cp.create_stage("abc123", &spec).await.unwrap();
        assert!(cp.create_stage("abc123", &spec).await.is_err());
        assert!(!cp.get_stage("abc123", "s").await.unwrap().is_absent());

        cp.delete_stage("abc123", "s").await.unwrap();
        assert!(cp.delete_stage("abc123", "s").await.unwrap_err().is_not_found());
        assert!(cp.get_stage("missing", "s").await.unwrap().is_absent());
    }

    #[tokio::test]
    async fn test_fault_is_consumed_once() {
        let cp = InMemoryControlPlane::new();
        cp.inject_fault(Operation::ListApis, Fault::Remote("throttled".into()))
            .await;

        let err = cp.list_apis(None).await.unwrap_err();
        assert!(err.to_string().contains("throttled"));
        assert!(cp.list_apis(None).await.is_ok());
        assert_eq!(cp.count(Operation::ListApis).await, 2);
    }
}
