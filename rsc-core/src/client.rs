use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::codec::ResourceIndex;
use crate::error::{ResError, Result};

/// 客户端发布的版本号。
pub type BuildNumber = u64;

/// 已知的客户端（服务器）代号。
///
/// 输入大小写不敏感，其余任何字符串都会被 [`ClientId::parse`] 拒绝。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum ClientId {
    Tranquility,
    Singularity,
    Chaos,
    Duality,
    Thunderdome,
}

impl ClientId {
    pub const ALL: [ClientId; 5] = [
        ClientId::Tranquility,
        ClientId::Singularity,
        ClientId::Chaos,
        ClientId::Duality,
        ClientId::Thunderdome,
    ];

    pub fn code(&self) -> &'static str {
        match self {
            Self::Tranquility => "tq",
            Self::Singularity => "sisi",
            Self::Chaos => "chaos",
            Self::Duality => "duality",
            Self::Thunderdome => "thunderdome",
        }
    }

    pub fn parse(input: &str) -> Result<Self> {
        let lowered = input.to_lowercase();
        Self::ALL
            .into_iter()
            .find(|client| client.code() == lowered)
            .ok_or(ResError::InvalidClient(lowered))
    }

    /// 远端 build 清单的文件名，例如 `eveclient_TQ.json`。
    pub fn manifest_file_name(&self) -> String {
        format!("eveclient_{}.json", self.code().to_uppercase())
    }
}

impl fmt::Display for ClientId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for ClientId {
    type Err = ResError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl TryFrom<String> for ClientId {
    type Error = ResError;

    fn try_from(value: String) -> Result<Self> {
        Self::parse(&value)
    }
}

impl From<ClientId> for String {
    fn from(client: ClientId) -> Self {
        client.code().to_string()
    }
}

/// 在 API 边界上把调用方给出的客户端标识校验为 [`ClientId`]。
pub trait IntoClientId {
    fn into_client_id(self) -> Result<ClientId>;
}

impl IntoClientId for ClientId {
    fn into_client_id(self) -> Result<ClientId> {
        Ok(self)
    }
}

impl IntoClientId for &str {
    fn into_client_id(self) -> Result<ClientId> {
        ClientId::parse(self)
    }
}

impl IntoClientId for &String {
    fn into_client_id(self) -> Result<ClientId> {
        ClientId::parse(self)
    }
}

impl IntoClientId for String {
    fn into_client_id(self) -> Result<ClientId> {
        ClientId::parse(&self)
    }
}

/// 某个客户端在某个 build 下的资源清单快照。
#[derive(Debug, Clone)]
pub struct ClientInfo {
    pub build: BuildNumber,
    pub client: ClientId,
    pub index: Arc<ResourceIndex>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_is_case_insensitive() {
        assert_eq!(ClientId::parse("TQ").unwrap(), ClientId::Tranquility);
        assert_eq!(ClientId::parse("Sisi").unwrap(), ClientId::Singularity);
        assert_eq!(
            "ThunderDome".parse::<ClientId>().unwrap(),
            ClientId::Thunderdome
        );
    }

    #[test]
    fn unknown_client_is_rejected() {
        match ClientId::parse("not-a-real-client") {
            Err(ResError::InvalidClient(name)) => assert_eq!(name, "not-a-real-client"),
            other => panic!("unexpected result: {other:?}"),
        }
        assert!(ClientId::parse("").is_err());
        assert!(ClientId::parse(" tq").is_err());
    }

    #[test]
    fn manifest_name_uses_upper_case_code() {
        assert_eq!(ClientId::Tranquility.manifest_file_name(), "eveclient_TQ.json");
        assert_eq!(
            ClientId::Thunderdome.manifest_file_name(),
            "eveclient_THUNDERDOME.json"
        );
    }

    #[test]
    fn serde_uses_short_codes() {
        let json = serde_json::to_string(&ClientId::Singularity).unwrap();
        assert_eq!(json, "\"sisi\"");
        let parsed: ClientId = serde_json::from_str("\"DUALITY\"").unwrap();
        assert_eq!(parsed, ClientId::Duality);
        assert!(serde_json::from_str::<ClientId>("\"moon\"").is_err());
    }
}
