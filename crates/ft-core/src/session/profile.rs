use serde::{Deserialize, Serialize};

/// Self-reported fitness attributes attached to a user profile.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FitnessAttributes {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub age: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height_cm: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weight_kg: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fitness_level: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub activity_level: Option<String>,
}

impl FitnessAttributes {
    /// Overwrite every field that is present in `patch`.
    pub fn merge(&mut self, patch: FitnessAttributes) {
        if patch.age.is_some() {
            self.age = patch.age;
        }
        if patch.height_cm.is_some() {
            self.height_cm = patch.height_cm;
        }
        if patch.weight_kg.is_some() {
            self.weight_kg = patch.weight_kg;
        }
        if patch.fitness_level.is_some() {
            self.fitness_level = patch.fitness_level;
        }
        if patch.activity_level.is_some() {
            self.activity_level = patch.activity_level;
        }
    }
}

/// The signed-in user as returned by the auth API.
///
/// Replaced wholesale on sign-in, patched on profile update.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub id: String,
    pub name: String,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
    #[serde(default)]
    pub fitness: FitnessAttributes,
}

/// A partial update for [`UserProfile`].
///
/// Top-level fields replace; `fitness` merges one level deep.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfilePatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fitness: Option<FitnessAttributes>,
}

impl UserProfilePatch {
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }

    pub fn apply_to(self, user: &mut UserProfile) {
        if let Some(name) = self.name {
            user.name = name;
        }
        if let Some(email) = self.email {
            user.email = email;
        }
        if self.avatar_url.is_some() {
            user.avatar_url = self.avatar_url;
        }
        if let Some(fitness) = self.fitness {
            user.fitness.merge(fitness);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user() -> UserProfile {
        UserProfile {
            id: "u-1".into(),
            name: "Ada".into(),
            email: "ada@example.com".into(),
            avatar_url: None,
            fitness: FitnessAttributes {
                age: Some(30),
                weight_kg: Some(61.5),
                ..Default::default()
            },
        }
    }

    #[test]
    fn patch_replaces_only_present_fields() {
        let mut profile = user();
        UserProfilePatch {
            name: Some("Ada L.".into()),
            ..Default::default()
        }
        .apply_to(&mut profile);

        assert_eq!(profile.name, "Ada L.");
        assert_eq!(profile.email, "ada@example.com");
        assert_eq!(profile.fitness.age, Some(30));
    }

    #[test]
    fn fitness_patch_merges_field_by_field() {
        let mut profile = user();
        UserProfilePatch {
            fitness: Some(FitnessAttributes {
                height_cm: Some(170.0),
                ..Default::default()
            }),
            ..Default::default()
        }
        .apply_to(&mut profile);

        assert_eq!(profile.fitness.height_cm, Some(170.0));
        assert_eq!(profile.fitness.weight_kg, Some(61.5));
    }

    #[test]
    fn profile_json_uses_camel_case() {
        let json = serde_json::to_value(user()).unwrap();
        assert!(json.get("avatarUrl").is_none());
        assert_eq!(json["fitness"]["weightKg"], 61.5);
    }
}
