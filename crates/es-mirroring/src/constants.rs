use const_format::concatcp;

/// resource type segment of a mirroring config id
pub const MIRRORING_CONFIG_RESOURCE_TYPE: &str = "mirroring-config";

/// instance extension holding the admin REST endpoint
pub const KAFKA_HTTP_URL_EXTENSION: &str = "kafka_http_url";

/// substring a plan id must contain for mirroring to be available
pub const ENTERPRISE_PLAN: &str = "enterprise";

pub const DEFAULT_IAM_URL: &str = "https://iam.cloud.ibm.com";
pub const DEFAULT_RESOURCE_CONTROLLER_URL: &str = "https://resource-controller.cloud.ibm.com";

/// IAM API URL chunks
pub const IAM_API_TOKEN: &str = "identity/token";
pub const IAM_GRANT_TYPE_APIKEY: &str = "urn:ibm:params:oauth:grant-type:apikey";

/// resource controller API URL chunks
pub const RC_API_V: &str = "v2";
pub const RC_API_INSTANCES: &str = concatcp!(RC_API_V, "/resource_instances");

/// admin REST API URL chunks
pub const ADMIN_API: &str = "admin";
pub const ADMIN_API_MIRRORING: &str = concatcp!(ADMIN_API, "/mirroring");
pub const ADMIN_API_TOPIC_SELECTION: &str = concatcp!(ADMIN_API_MIRRORING, "/topic-selection");

/// config lookup
pub const CONFIG_PATH_ENV: &str = "ES_MIRRORING_CONFIG";
pub const CLI_CONFIG_PATH: &str = ".eventstreams";
pub const CLI_CONFIG_FILE: &str = "config";
pub const API_KEY_ENVS: [&str; 2] = ["IC_API_KEY", "IBMCLOUD_API_KEY"];
