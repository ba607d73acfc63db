pub mod connection;
pub mod meal_logs;
pub mod profiles;
pub(crate) mod schema;
#[cfg(test)]
pub(crate) mod test_utils;
pub mod users;

pub use connection::{DbPool, init_db};
pub use meal_logs::{
    DEFAULT_LIST_LIMIT, MealFields, add_meal, delete_meal, get_meals, get_meals_for_date,
    update_meal,
};
pub use profiles::{get_profile, upsert_profile};
pub use users::{authenticate, create_user, delete_user};
