pub const SERVER_URL: &str = "https://osdu.test";
pub const PARTITION: &str = "opendes";
pub const DOMAIN: &str = "example.org";
pub const CLIENT_ID: &str = "abc";
pub const TOKEN: &str = "T1";
