use crate::{
    err,
    error::ErrorTree,
    naming::is_identifier,
    node::{RpcKind, RpcType},
};

///
/// ValidateVisitor
///
/// Walks a type tree keeping the route of the node being checked; errors
/// are recorded under that route.
///

#[derive(Debug, Default)]
pub struct ValidateVisitor {
    pub errors: ErrorTree,
    route: Vec<String>,
}

impl ValidateVisitor {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            errors: ErrorTree::new(),
            route: Vec::new(),
        }
    }

    // visit
    pub fn visit(&mut self, key: &str, ty: &RpcType) {
        self.route.push(key.to_string());
        self.check(ty);
        self.route.pop();
    }

    fn check(&mut self, ty: &RpcType) {
        match &ty.kind {
            RpcKind::List { elem } => {
                if elem.is_void() {
                    self.push_error("list element cannot be void");
                }
                // no wire encoding for a list directly inside a list
                if elem.is_list() {
                    self.push_error("list element cannot be a list");
                }
                self.visit("elem", elem);
            }
            RpcKind::Dict { fields } => {
                for (name, field) in fields.iter() {
                    if !is_identifier(name) {
                        self.push_error(format!("field name '{name}' is not an identifier"));
                    }
                    self.visit(name, field);
                }
            }
            RpcKind::Enum {
                underlying,
                members,
                ..
            } => {
                if !underlying.is_base_type() {
                    self.push_error("enum underlying type must be a scalar");
                }
                if members.is_empty() {
                    self.push_error("enum has no members");
                }
            }
            _ => {}
        }
    }

    fn push_error(&mut self, message: impl Into<String>) {
        let mut tree = ErrorTree::new();
        err!(tree, "{}", message.into());

        // nest under the current route so messages read `a.b: message`
        let mut wrapped = tree;
        for segment in self.route.iter().skip(1).rev() {
            let mut parent = ErrorTree::new();
            parent.add_child(segment.clone(), wrapped);
            wrapped = parent;
        }
        match self.route.first() {
            Some(first) => self.errors.add_child(first.clone(), wrapped),
            None => self.errors.add_child(String::new(), wrapped),
        }
    }
}
