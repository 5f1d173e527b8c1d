use serde::Serialize;

/// Outcome of verifying a token. Every failure has its own cause.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Verdict {
    Ok,
    /// Unsupported version, or the token could not be decrypted or parsed.
    ErrVer,
    Expired,
    ErrIp,
    ErrUa,
    ErrUid,
    ErrSalt,
    ErrHash,
    /// No live state record backs the token.
    ErrState,
}

impl Verdict {
    /// Numeric code: 0 for OK, negative for failures.
    pub fn code(self) -> i32 {
        match self {
            Verdict::Ok => 0,
            Verdict::ErrVer => -1,
            Verdict::Expired => -2,
            Verdict::ErrIp => -3,
            Verdict::ErrUa => -4,
            Verdict::ErrUid => -5,
            Verdict::ErrSalt => -6,
            Verdict::ErrHash => -7,
            Verdict::ErrState => -8,
        }
    }

    pub fn is_ok(self) -> bool {
        self == Verdict::Ok
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Verdict::Ok => "OK",
            Verdict::ErrVer => "ERR_VER",
            Verdict::Expired => "EXPIRED",
            Verdict::ErrIp => "ERR_IP",
            Verdict::ErrUa => "ERR_UA",
            Verdict::ErrUid => "ERR_UID",
            Verdict::ErrSalt => "ERR_SALT",
            Verdict::ErrHash => "ERR_HASH",
            Verdict::ErrState => "ERR_STATE",
        }
    }
}

impl std::fmt::Display for Verdict {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
