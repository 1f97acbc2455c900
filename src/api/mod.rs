// API client module: one generic `call` that sends a request through a
// `Transport` and decodes the envelope, plus a thin method per endpoint.
// Endpoint methods only pick the path, the form fields and the payload type.

pub mod envelope;
pub mod transport;

use std::fmt;
use std::str::FromStr;

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use tracing::debug;

use crate::config::ClientConfig;
use crate::error::{ClientError, SetupError};
use crate::models::{
    Acknowledgement, DeployResult, EvoPermissions, Instance, InstanceState, OsGroup, Plan,
    RebuildResult, Renewal, SshKey, UserInfo,
};

use self::envelope::{Payload, StatusPolicy};
pub use self::transport::{ApiRequest, FormParams, HttpTransport, RequestBody, Transport};

/// Client session: a transport plus the envelope status policy. Immutable
/// once built; every call is independent.
pub struct ApiClient<T: Transport = HttpTransport> {
    transport: T,
    policy: StatusPolicy,
}

impl ApiClient<HttpTransport> {
    /// Create a client that talks HTTP using `config`.
    pub fn new(config: &ClientConfig) -> Result<Self, SetupError> {
        let transport = HttpTransport::new(config)?;
        Ok(Self::with_transport(transport, config.status_policy))
    }
}

impl<T: Transport> ApiClient<T> {
    pub fn with_transport(transport: T, policy: StatusPolicy) -> Self {
        Self { transport, policy }
    }

    /// Execute `request` and decode the response as payload `P`.
    pub fn call<P: Payload>(&self, request: &ApiRequest) -> Result<P, ClientError> {
        let body = self.transport.execute(request)?;
        let payload = envelope::decode::<P>(&body, self.policy)?;
        debug!(path = request.path, shape = P::SHAPE, "decoded response");
        Ok(payload)
    }

    /// List all instances on the account.
    pub fn list_instances(&self) -> Result<Vec<Instance>, ClientError> {
        self.call(&ApiRequest::get("/Evo/Instance"))
    }

    pub fn deploy_instance(&self, params: &DeployParams) -> Result<DeployResult, ClientError> {
        let form = FormParams::new()
            .field("product_id", &params.product_id)
            .field("os_id", &params.os_id)
            .field("time", &params.time)
            .optional("sshKey", params.ssh_key.as_deref())
            .optional("bootScript", params.boot_script.as_deref().map(encode_boot_script));
        self.call(&ApiRequest::form("/Evo/Deploy", form))
    }

    pub fn destroy_instance(&self, id: &str) -> Result<Acknowledgement, ClientError> {
        let form = FormParams::new().field("id", id);
        self.call(&ApiRequest::form("/Evo/Destroy", form))
    }

    pub fn power_instance(
        &self,
        id: &str,
        action: PowerAction,
    ) -> Result<Acknowledgement, ClientError> {
        let form = FormParams::new()
            .field("id", id)
            .field("action", action.as_str());
        self.call(&ApiRequest::form("/Evo/Power", form))
    }

    /// Reinstall an instance with a new OS. Returns the new credentials.
    pub fn rebuild_instance(&self, params: &RebuildParams) -> Result<RebuildResult, ClientError> {
        let form = FormParams::new()
            .field("id", &params.id)
            .field("os", &params.os_id)
            .optional("sshKey", params.ssh_key.as_deref())
            .optional("bootScript", params.boot_script.as_deref().map(encode_boot_script));
        self.call(&ApiRequest::form("/Evo/Rebuild", form))
    }

    pub fn list_plans(&self) -> Result<Vec<Plan>, ClientError> {
        self.call(&ApiRequest::get("/Evo/Plan"))
    }

    /// Operating systems available for a plan.
    pub fn os_by_plan(&self, plan_id: &str) -> Result<Vec<OsGroup>, ClientError> {
        let form = FormParams::new().field("plan_id", plan_id);
        self.call(&ApiRequest::form("/Evo/getOSByPlan", form))
    }

    /// Extend an instance by `hours`.
    pub fn renew_instance(&self, id: &str, hours: &str) -> Result<Renewal, ClientError> {
        let form = FormParams::new().field("id", id).field("time", hours);
        self.call(&ApiRequest::form("/Evo/Renewal", form))
    }

    pub fn instance_state(&self, id: &str) -> Result<InstanceState, ClientError> {
        let form = FormParams::new().field("id", id);
        self.call(&ApiRequest::form("/Evo/State", form))
    }

    pub fn list_ssh_keys(&self) -> Result<Vec<SshKey>, ClientError> {
        self.call(&ApiRequest::get("/User/SSHKey"))
    }

    pub fn evo_permissions(&self) -> Result<EvoPermissions, ClientError> {
        self.call(&ApiRequest::get("/User/EVOPermissions"))
    }

    pub fn user_info(&self) -> Result<UserInfo, ClientError> {
        self.call(&ApiRequest::get("/User/Info"))
    }
}

/// Boot scripts travel base64-encoded.
fn encode_boot_script(script: &str) -> String {
    STANDARD.encode(script.as_bytes())
}

/// Fields for `/Evo/Deploy`. Durations are hours, ids are passed through as
/// typed by the user.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeployParams {
    pub product_id: String,
    pub os_id: String,
    pub time: String,
    pub ssh_key: Option<String>,
    /// Plain script text; encoded before sending.
    pub boot_script: Option<String>,
}

/// Fields for `/Evo/Rebuild`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RebuildParams {
    pub id: String,
    pub os_id: String,
    pub ssh_key: Option<String>,
    pub boot_script: Option<String>,
}

/// Power actions accepted by `/Evo/Power`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PowerAction {
    Boot,
    Shutdown,
    Restart,
    Poweroff,
}

impl PowerAction {
    pub const ALL: [PowerAction; 4] = [
        PowerAction::Boot,
        PowerAction::Shutdown,
        PowerAction::Restart,
        PowerAction::Poweroff,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            PowerAction::Boot => "boot",
            PowerAction::Shutdown => "shutdown",
            PowerAction::Restart => "restart",
            PowerAction::Poweroff => "poweroff",
        }
    }
}

impl fmt::Display for PowerAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PowerAction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        PowerAction::ALL
            .into_iter()
            .find(|a| a.as_str() == wanted)
            .ok_or_else(|| format!("unknown power action {s:?} (expected boot, shutdown, restart or poweroff)"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TransportError;
    use std::cell::RefCell;

    /// Replays a canned response and records every request it receives.
    struct StubTransport {
        status: u16,
        body: &'static str,
        seen: RefCell<Vec<ApiRequest>>,
    }

    impl StubTransport {
        fn new(status: u16, body: &'static str) -> Self {
            Self {
                status,
                body,
                seen: RefCell::new(Vec::new()),
            }
        }
    }

    impl Transport for StubTransport {
        fn execute(&self, request: &ApiRequest) -> Result<Vec<u8>, TransportError> {
            self.seen.borrow_mut().push(request.clone());
            if self.status >= 400 {
                return Err(TransportError::HttpStatus {
                    status: self.status,
                    body: self.body.to_string(),
                });
            }
            Ok(self.body.as_bytes().to_vec())
        }
    }

    fn client(status: u16, body: &'static str) -> ApiClient<StubTransport> {
        ApiClient::with_transport(StubTransport::new(status, body), StatusPolicy::Ignore)
    }

    fn form_of(request: &ApiRequest) -> &FormParams {
        match &request.body {
            RequestBody::Form(params) => params,
            RequestBody::Empty => panic!("expected a form body for {}", request.path),
        }
    }

    #[test]
    fn deploy_without_ssh_key_sends_exactly_three_fields() {
        let api = client(
            200,
            r#"{"status":200,"message":"ok","data":{"id":"i-1","password":"p","ipv4":"1.2.3.4","ipv6":"","hostname":"h1"}}"#,
        );
        let params = DeployParams {
            product_id: "10".into(),
            os_id: "5".into(),
            time: "24".into(),
            ..Default::default()
        };

        let deployed = api.deploy_instance(&params).unwrap();
        assert_eq!(deployed.id, "i-1");
        assert_eq!(deployed.ipv4, "1.2.3.4");

        let seen = api.transport.seen.borrow();
        assert_eq!(seen[0].path, "/Evo/Deploy");
        assert_eq!(
            form_of(&seen[0]).fields(),
            &[
                ("product_id", "10".to_string()),
                ("os_id", "5".to_string()),
                ("time", "24".to_string()),
            ]
        );
    }

    #[test]
    fn deploy_encodes_boot_script() {
        let api = client(200, r#"{"status":200,"message":"ok","data":{}}"#);
        let params = DeployParams {
            product_id: "1".into(),
            os_id: "2".into(),
            time: "1".into(),
            ssh_key: Some("8".into()),
            boot_script: Some("echo hi".into()),
        };

        api.deploy_instance(&params).unwrap();

        let seen = api.transport.seen.borrow();
        let form = form_of(&seen[0]);
        assert_eq!(form.get("sshKey"), Some("8"));
        assert_eq!(form.get("bootScript"), Some("ZWNobyBoaQ=="));
    }

    #[test]
    fn destroy_returns_message_despite_null_data() {
        let api = client(200, r#"{"status":200,"message":"destroyed","data":null}"#);
        let ack = api.destroy_instance("99").unwrap();
        assert_eq!(ack.message(), "destroyed");

        let seen = api.transport.seen.borrow();
        assert_eq!(form_of(&seen[0]).fields(), &[("id", "99".to_string())]);
    }

    #[test]
    fn http_failure_is_never_decoded() {
        // A perfectly valid envelope still surfaces as an HTTP status error.
        let api = client(502, r#"{"status":200,"message":"ok","data":null}"#);
        let err = api.destroy_instance("1").unwrap_err();
        assert!(matches!(err, ClientError::HttpStatus { status: 502, .. }));
    }

    #[test]
    fn garbage_body_is_envelope_error() {
        let api = client(200, "upstream timeout");
        let err = api.user_info().unwrap_err();
        assert!(matches!(err, ClientError::EnvelopeDecode(_)));
    }

    #[test]
    fn wrong_data_shape_names_the_target() {
        let api = client(200, r#"{"status":200,"message":"ok","data":[1,2]}"#);
        let err = api.user_info().unwrap_err();
        assert!(matches!(err, ClientError::PayloadDecode { shape: "user info", .. }));
    }

    #[test]
    fn repeated_calls_yield_identical_results() {
        let api = client(
            200,
            r#"{"status":200,"message":"ok","data":[{"id":1,"name":"k","publickey":"ssh-ed25519 AAAA","created_at":"2024-01-01"}]}"#,
        );
        let first = api.list_ssh_keys().unwrap();
        let second = api.list_ssh_keys().unwrap();
        assert_eq!(first, second);
        assert_eq!(api.transport.seen.borrow().len(), 2);
    }

    #[test]
    fn operations_use_expected_endpoints() {
        let api = client(200, r#"{"status":200,"message":"ok","data":null}"#);

        api.list_instances().unwrap();
        api.power_instance("3", PowerAction::Restart).unwrap();
        api.list_plans().unwrap();
        api.os_by_plan("4").unwrap();
        api.list_ssh_keys().unwrap();

        let seen = api.transport.seen.borrow();
        let paths: Vec<_> = seen.iter().map(|r| r.path).collect();
        assert_eq!(
            paths,
            ["/Evo/Instance", "/Evo/Power", "/Evo/Plan", "/Evo/getOSByPlan", "/User/SSHKey"]
        );
        assert_eq!(seen[0].body, RequestBody::Empty);
        assert_eq!(form_of(&seen[1]).get("action"), Some("restart"));
        assert_eq!(form_of(&seen[3]).get("plan_id"), Some("4"));
    }

    #[test]
    fn rebuild_and_renew_fields() {
        let api = client(200, r#"{"status":200,"message":"ok","data":{}}"#);
        api.rebuild_instance(&RebuildParams {
            id: "7".into(),
            os_id: "12".into(),
            ssh_key: None,
            boot_script: None,
        })
        .unwrap();
        api.renew_instance("7", "48").unwrap();

        let seen = api.transport.seen.borrow();
        assert_eq!(
            form_of(&seen[0]).fields(),
            &[("id", "7".to_string()), ("os", "12".to_string())]
        );
        assert_eq!(
            form_of(&seen[1]).fields(),
            &[("id", "7".to_string()), ("time", "48".to_string())]
        );
    }

    #[test]
    fn enforce_policy_surfaces_rejection() {
        let api = ApiClient::with_transport(
            StubTransport::new(200, r#"{"status":403,"message":"no permission","data":null}"#),
            StatusPolicy::Enforce,
        );
        let err = api.evo_permissions().unwrap_err();
        assert!(matches!(err, ClientError::Rejected { status: 403, .. }));
    }

    #[test]
    fn power_action_parsing() {
        assert_eq!(" Restart ".parse::<PowerAction>(), Ok(PowerAction::Restart));
        assert_eq!("poweroff".parse::<PowerAction>(), Ok(PowerAction::Poweroff));
        assert!("reboot".parse::<PowerAction>().is_err());
    }
}
