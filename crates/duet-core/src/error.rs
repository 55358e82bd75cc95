/// Explicit failures raised by room lifecycle and game actions.
///
/// Illegal-but-well-formed game actions are not errors; they are absorbed as
/// no-ops by the room manager.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoomError {
    /// Both seats are held by other participants.
    RoomFull,
    /// The requested seat is held by a different participant.
    RoleTaken,
    /// The caller already holds the other seat.
    RoleLocked,
    /// The caller does not hold the seat it claims.
    Forbidden,
    /// A restart was requested while a seat is vacant.
    NeedBothPlayers,
}

impl RoomError {
    /// Stable machine-readable kind, sent alongside the message.
    pub fn code(self) -> &'static str {
        match self {
            Self::RoomFull => "ROOM_FULL",
            Self::RoleTaken => "ROLE_TAKEN",
            Self::RoleLocked => "ROLE_LOCKED",
            Self::Forbidden => "FORBIDDEN",
            Self::NeedBothPlayers => "NEED_BOTH_PLAYERS",
        }
    }
}

impl std::fmt::Display for RoomError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::RoomFull => write!(f, "Room is full"),
            Self::RoleTaken => write!(f, "Role is already occupied"),
            Self::RoleLocked => write!(f, "You already joined as the other role"),
            Self::Forbidden => write!(f, "Access forbidden"),
            Self::NeedBothPlayers => write!(f, "Both players are required"),
        }
    }
}

impl std::error::Error for RoomError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_are_distinct() {
        let all = [
            RoomError::RoomFull,
            RoomError::RoleTaken,
            RoomError::RoleLocked,
            RoomError::Forbidden,
            RoomError::NeedBothPlayers,
        ];
        let mut codes: Vec<_> = all.iter().map(|e| e.code()).collect();
        codes.sort_unstable();
        codes.dedup();
        assert_eq!(codes.len(), all.len());
    }
}
