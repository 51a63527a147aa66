//! Cookie-backed cart.
//!
//! The cookie is the only state: two concurrent requests from the same client
//! both read the old list and the last response to arrive wins.

use crate::model::{AddToCartRequest, CartLine};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use common::config::CartConfig;

pub const CART_COOKIE: &str = "orders";
pub const PLACED_ORDERS_COOKIE: &str = "placed_orders";

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Cart {
    lines: Vec<CartLine>,
}

impl Cart {
    pub fn new(lines: Vec<CartLine>) -> Self {
        Self { lines }
    }

    /// Decodes the cart from a cookie value. An absent cookie is an empty cart.
    pub fn from_cookie_value(value: Option<&str>) -> Result<Self, serde_json::Error> {
        match value {
            Some(raw) if !raw.is_empty() => Ok(Self::new(serde_json::from_str(raw)?)),
            _ => Ok(Self::default()),
        }
    }

    pub fn from_jar(jar: &CookieJar) -> Result<Self, serde_json::Error> {
        Self::from_cookie_value(jar.get(CART_COOKIE).map(|cookie| cookie.value()))
    }

    pub fn to_cookie_value(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(&self.lines)
    }

    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    pub fn into_lines(self) -> Vec<CartLine> {
        self.lines
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Increments the quantity of the line with the same id, or appends a new
    /// line with quantity 1. Returns the resulting line, or an error when the
    /// quantity read from the cookie cannot grow any further.
    pub fn add(&mut self, request: AddToCartRequest) -> Result<&CartLine, String> {
        let index = match self.lines.iter().position(|line| line.id == request.id) {
            Some(index) => {
                let line = &mut self.lines[index];
                line.quantity = line.quantity.checked_add(1).ok_or_else(|| {
                    format!("Quantity of cart line {} cannot be increased", line.id)
                })?;
                index
            }
            None => {
                self.lines.push(CartLine {
                    id: request.id,
                    name: request.name,
                    price: request.price,
                    quantity: 1,
                });
                self.lines.len() - 1
            }
        };
        Ok(&self.lines[index])
    }

    /// Drops every line with `id`. Returns whether anything was removed.
    pub fn remove(&mut self, id: &str) -> bool {
        let before = self.lines.len();
        self.lines.retain(|line| line.id != id);
        self.lines.len() != before
    }
}

/// Builds a cart cookie with the configured expiry and flags.
pub fn cart_cookie(name: &'static str, value: String, config: &CartConfig) -> Cookie<'static> {
    Cookie::build((name, value))
        .path("/")
        .max_age(time::Duration::seconds(config.cookie_max_age_secs))
        .http_only(true)
        .secure(config.secure_cookies)
        .same_site(SameSite::Lax)
        .build()
}
