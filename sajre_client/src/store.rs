//! Offline registry of users mirrored into the `entities` storage key.
//!
//! The backend is the system of record; this store backs the demo mode and
//! the student dashboard's profile edits.

use crate::error::StoreError;
use crate::models::Role;
use crate::referral::make_referral_code;
use crate::storage::{Storage, CURRENT_USER_KEY, ENTITIES_KEY};
use serde::{Deserialize, Serialize};
use std::collections::{HashSet, VecDeque};
use std::sync::Arc;

pub const DEFAULT_ADMIN_ID: &str = "admin-1";
pub const DEFAULT_ADMIN_EMAIL: &str = "admin@example.com";
pub const DEFAULT_ADMIN_PASSWORD: &str = "Admin@123";
pub const DEFAULT_ADMIN_CODE: &str = "ADM01";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct VendorProfile {
    pub company_name: String,
    pub description: String,
    pub mentor_count: u32,
    pub student_count: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MentorProfile {
    pub specialization: String,
    pub vendor_id: Option<String>,
    pub student_count: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StudentProfile {
    pub mentor_id: Option<String>,
    pub is_enrolled: bool,
}

/// Role plus the fields only that role carries. Serialized flat, with
/// `role` as the tag.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "role", rename_all = "lowercase")]
pub enum Profile {
    Admin,
    Vendor(VendorProfile),
    Mentor(MentorProfile),
    #[serde(rename = "user", alias = "student")]
    Student(StudentProfile),
}

impl Profile {
    pub fn role(&self) -> Role {
        match self {
            Profile::Admin => Role::Admin,
            Profile::Vendor(_) => Role::Vendor,
            Profile::Mentor(_) => Role::Mentor,
            Profile::Student(_) => Role::Student,
        }
    }
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Entity {
    pub id: String,
    #[serde(flatten)]
    pub profile: Profile,
    pub username: String,
    pub email: String,
    /// bcrypt hash.
    pub password: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub photo: Option<String>,
    pub referral_code: String,
    #[serde(default)]
    pub referred_by_id: Option<String>,
    #[serde(default)]
    pub verified: bool,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

impl Entity {
    pub fn role(&self) -> Role {
        self.profile.role()
    }
}

#[derive(Debug, Clone)]
pub struct NewUser {
    pub id: Option<String>,
    pub username: String,
    pub email: String,
    pub password: String,
    pub phone: Option<String>,
    pub referral_code: Option<String>,
    pub referred_by_id: Option<String>,
    pub profile: Profile,
}

impl NewUser {
    pub fn new(username: &str, email: &str, password: &str, profile: Profile) -> Self {
        Self {
            id: None,
            username: username.to_string(),
            email: email.to_string(),
            password: password.to_string(),
            phone: None,
            referral_code: None,
            referred_by_id: None,
            profile,
        }
    }
}

/// Fields `update_user` merges; `None` leaves the stored value alone.
#[derive(Debug, Clone, Default)]
pub struct UserUpdate {
    pub username: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub phone: Option<String>,
    pub bio: Option<String>,
    pub photo: Option<String>,
    pub verified: Option<bool>,
    pub is_active: Option<bool>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RoleCounts {
    pub admins: usize,
    pub vendors: usize,
    pub mentors: usize,
    pub users: usize,
}

#[derive(Debug, Clone, Copy)]
pub struct StoreOptions {
    pub password_cost: u32,
}

impl Default for StoreOptions {
    fn default() -> Self {
        Self {
            password_cost: bcrypt::DEFAULT_COST,
        }
    }
}

pub struct LocalStore {
    storage: Arc<dyn Storage>,
    options: StoreOptions,
    entities: Vec<Entity>,
    current_user_id: Option<String>,
}

impl LocalStore {
    /// Reads `entities` from storage, or starts from the default admin when
    /// nothing has been saved yet. A saved current user is restored if it
    /// still exists.
    pub fn load(storage: Arc<dyn Storage>, options: StoreOptions) -> Result<Self, StoreError> {
        let entities: Vec<Entity> = match storage.get_item(ENTITIES_KEY)? {
            Some(raw) => serde_json::from_str(&raw).map_err(StoreError::Corrupt)?,
            None => vec![default_admin(options.password_cost)?],
        };
        let current_user_id = storage
            .get_item(CURRENT_USER_KEY)?
            .filter(|id| entities.iter().any(|e| &e.id == id));
        Ok(Self {
            storage,
            options,
            entities,
            current_user_id,
        })
    }

    pub fn entities(&self) -> &[Entity] {
        &self.entities
    }

    pub fn current_user_id(&self) -> Option<&str> {
        self.current_user_id.as_deref()
    }

    pub fn set_current_user(&mut self, id: Option<String>) {
        self.current_user_id = id;
    }

    pub fn current_user(&self) -> Option<&Entity> {
        self.current_user_id.as_deref().and_then(|id| self.get_by_id(id))
    }

    pub fn get_by_id(&self, id: &str) -> Option<&Entity> {
        self.entities.iter().find(|e| e.id == id)
    }

    pub fn find_by_code(&self, code: &str) -> Option<&Entity> {
        self.entities.iter().find(|e| e.referral_code == code)
    }

    /// Appends an unverified user. Emails are not checked for duplicates.
    pub fn add_user(&mut self, new_user: NewUser) -> Result<&Entity, StoreError> {
        let entity = self.build_entity(new_user)?;
        tracing::debug!(id = %entity.id, role = %entity.role(), "adding user to local store");
        self.commit_with(|entities| entities.push(entity))?;
        Ok(&self.entities[self.entities.len() - 1])
    }

    /// Registers `new_user` under the owner of `code`, enforcing the
    /// admin -> vendor -> mentor -> student chain.
    pub fn add_referred_user(&mut self, code: &str, mut new_user: NewUser) -> Result<&Entity, StoreError> {
        let requested = new_user.profile.role();
        let creator = self
            .find_by_code(code.trim())
            .ok_or_else(|| StoreError::UnknownReferralCode(code.to_string()))?;
        if requested.parent() != Some(creator.role()) {
            return Err(StoreError::WrongReferrer {
                creator: creator.role(),
                requested,
            });
        }
        let creator_id = creator.id.clone();

        match &mut new_user.profile {
            Profile::Mentor(mentor) => mentor.vendor_id = Some(creator_id.clone()),
            Profile::Student(student) => {
                student.mentor_id = Some(creator_id.clone());
                // A student's code is the one they registered with.
                new_user.referral_code = Some(code.trim().to_string());
            }
            Profile::Admin | Profile::Vendor(_) => {}
        }
        new_user.referred_by_id = Some(creator_id.clone());

        let entity = self.build_entity(new_user)?;
        tracing::debug!(id = %entity.id, creator = %creator_id, "adding referred user to local store");
        self.commit_with(|entities| {
            if let Some(creator) = entities.iter_mut().find(|e| e.id == creator_id) {
                match &mut creator.profile {
                    Profile::Vendor(vendor) => vendor.mentor_count += 1,
                    Profile::Mentor(mentor) => mentor.student_count += 1,
                    Profile::Admin | Profile::Student(_) => {}
                }
            }
            entities.push(entity);
        })?;
        Ok(&self.entities[self.entities.len() - 1])
    }

    /// Shallow merge. Returns `false`, without touching storage, when `id`
    /// is unknown.
    pub fn update_user(&mut self, id: &str, updates: UserUpdate) -> Result<bool, StoreError> {
        let Some(index) = self.entities.iter().position(|e| e.id == id) else {
            return Ok(false);
        };
        let mut entity = self.entities[index].clone();
        if let Some(plain) = updates.password {
            entity.password = bcrypt::hash(plain, self.options.password_cost)?;
        }
        if let Some(username) = updates.username {
            entity.username = username;
        }
        if let Some(email) = updates.email {
            entity.email = email;
        }
        if let Some(phone) = updates.phone {
            entity.phone = Some(phone);
        }
        if let Some(bio) = updates.bio {
            entity.bio = Some(bio);
        }
        if let Some(photo) = updates.photo {
            entity.photo = Some(photo);
        }
        if let Some(verified) = updates.verified {
            entity.verified = verified;
        }
        if let Some(is_active) = updates.is_active {
            entity.is_active = is_active;
        }
        self.commit_with(|entities| entities[index] = entity)?;
        Ok(true)
    }

    /// Flips a student's `isEnrolled` to true. Never flips it back; returns
    /// whether anything changed.
    pub fn mark_enrolled(&mut self, id: &str) -> Result<bool, StoreError> {
        let index = self.entities.iter().position(|e| {
            e.id == id && matches!(&e.profile, Profile::Student(student) if !student.is_enrolled)
        });
        let Some(index) = index else {
            return Ok(false);
        };
        self.commit_with(|entities| {
            if let Profile::Student(student) = &mut entities[index].profile {
                student.is_enrolled = true;
            }
        })?;
        Ok(true)
    }

    /// Plain email/password check against the stored hashes. Only the
    /// in-memory current user changes; see [`LocalStore::save_current_user`].
    pub fn login(&mut self, email: &str, password: &str) -> Option<&Entity> {
        let index = self
            .entities
            .iter()
            .position(|e| e.email == email && bcrypt::verify(password, &e.password).unwrap_or(false))?;
        self.current_user_id = Some(self.entities[index].id.clone());
        Some(&self.entities[index])
    }

    /// Keeps the current user for the next [`LocalStore::load`], or forgets
    /// it when nobody is signed in.
    pub fn save_current_user(&self) -> Result<(), StoreError> {
        match &self.current_user_id {
            Some(id) => self.storage.set_item(CURRENT_USER_KEY, id)?,
            None => self.storage.remove_item(CURRENT_USER_KEY)?,
        }
        Ok(())
    }

    pub fn children_of(&self, parent_id: &str) -> Vec<&Entity> {
        self.entities
            .iter()
            .filter(|e| e.referred_by_id.as_deref() == Some(parent_id))
            .collect()
    }

    /// Everyone below `root_id`, breadth first, paired with their depth.
    pub fn descendants_of(&self, root_id: &str) -> Vec<(usize, &Entity)> {
        let mut out = Vec::new();
        let mut seen = HashSet::from([root_id]);
        let mut queue = VecDeque::from([(root_id.to_string(), 0usize)]);
        while let Some((id, depth)) = queue.pop_front() {
            for child in self.children_of(&id) {
                // hand-edited storage can contain cycles
                if !seen.insert(child.id.as_str()) {
                    continue;
                }
                out.push((depth + 1, child));
                queue.push_back((child.id.clone(), depth + 1));
            }
        }
        out
    }

    pub fn counts(&self) -> RoleCounts {
        self.entities.iter().fold(RoleCounts::default(), |mut acc, e| {
            match e.role() {
                Role::Admin => acc.admins += 1,
                Role::Vendor => acc.vendors += 1,
                Role::Mentor => acc.mentors += 1,
                Role::Student => acc.users += 1,
            }
            acc
        })
    }

    /// Back to the single default admin, signed out.
    pub fn reset(&mut self) -> Result<(), StoreError> {
        let admin = default_admin(self.options.password_cost)?;
        self.commit_with(|entities| *entities = vec![admin])?;
        self.current_user_id = None;
        self.save_current_user()
    }

    fn build_entity(&self, new_user: NewUser) -> Result<Entity, StoreError> {
        let role = new_user.profile.role();
        Ok(Entity {
            id: new_user.id.unwrap_or_else(|| uuid::Uuid::new_v4().to_string()),
            username: new_user.username,
            email: new_user.email,
            password: bcrypt::hash(&new_user.password, self.options.password_cost)?,
            phone: new_user.phone,
            bio: None,
            photo: None,
            referral_code: new_user.referral_code.unwrap_or_else(|| make_referral_code(role)),
            referred_by_id: new_user.referred_by_id,
            verified: false,
            is_active: true,
            profile: new_user.profile,
        })
    }

    /// Applies `change` to a copy, writes the copy, and only then adopts it.
    /// A failed write leaves the store as it was.
    fn commit_with(&mut self, change: impl FnOnce(&mut Vec<Entity>)) -> Result<(), StoreError> {
        let mut next = self.entities.clone();
        change(&mut next);
        let raw = serde_json::to_string(&next).map_err(StoreError::Serialize)?;
        self.storage.set_item(ENTITIES_KEY, &raw)?;
        self.entities = next;
        Ok(())
    }
}

fn default_admin(cost: u32) -> Result<Entity, StoreError> {
    Ok(Entity {
        id: DEFAULT_ADMIN_ID.to_string(),
        profile: Profile::Admin,
        username: "Admin".to_string(),
        email: DEFAULT_ADMIN_EMAIL.to_string(),
        password: bcrypt::hash(DEFAULT_ADMIN_PASSWORD, cost)?,
        phone: None,
        bio: None,
        photo: None,
        referral_code: DEFAULT_ADMIN_CODE.to_string(),
        referred_by_id: None,
        verified: true,
        is_active: true,
    })
}
