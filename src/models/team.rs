use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct TeamMember {
    pub username: String,
    pub user_id: u64,
    pub discord_id: String,
    pub avatar_url: String,
    pub country_emoji: String,
}

// identity only; display fields don't participate in dedup
impl PartialEq for TeamMember {
    fn eq(&self, other: &Self) -> bool {
        self.user_id == other.user_id && self.discord_id == other.discord_id
    }
}

impl Eq for TeamMember {}

#[derive(Debug, Clone, Serialize)]
pub struct Team {
    pub members: Vec<TeamMember>,
    pub name: String,
    pub avatar_url: String,
    pub country_emoji: String,
}

impl Team {
    /// display identity is copied from the first member and never changes
    /// afterwards. Returns None for an empty member list.
    pub fn new(members: Vec<TeamMember>) -> Option<Self> {
        let first = members.first()?;
        Some(Self {
            name: first.username.clone(),
            avatar_url: first.avatar_url.clone(),
            country_emoji: first.country_emoji.clone(),
            members,
        })
    }

    pub fn contains_user_id(&self, user_id: u64) -> bool {
        self.members.iter().any(|m| m.user_id == user_id)
    }

    pub fn contains_discord_id(&self, discord_id: &str) -> bool {
        self.members.iter().any(|m| m.discord_id == discord_id)
    }

    pub fn contains_member(&self, member: &TeamMember) -> bool {
        self.contains_user_id(member.user_id) || self.contains_discord_id(&member.discord_id)
    }
}
