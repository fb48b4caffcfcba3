/// The identity a service call acts on behalf of.
///
/// Services take this explicitly instead of reading request-scoped state,
/// so the same call can be made from a handler, a test, or a background task.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Viewer {
    Anonymous,
    User { user_id: i32, is_staff: bool },
}

impl Viewer {
    pub fn user(user_id: i32) -> Self {
        Viewer::User {
            user_id,
            is_staff: false,
        }
    }

    pub fn staff(user_id: i32) -> Self {
        Viewer::User {
            user_id,
            is_staff: true,
        }
    }

    pub fn user_id(&self) -> Option<i32> {
        match self {
            Viewer::Anonymous => None,
            Viewer::User { user_id, .. } => Some(*user_id),
        }
    }

    pub fn is_staff(&self) -> bool {
        matches!(self, Viewer::User { is_staff: true, .. })
    }
}
