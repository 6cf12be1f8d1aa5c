pub mod cart_products;
pub mod images;
pub mod keywords;
pub mod product_options;
pub mod products;
pub mod users;

pub use cart_products::Entity as CartProducts;
pub use images::Entity as Images;
pub use keywords::Entity as Keywords;
pub use product_options::Entity as ProductOptions;
pub use products::Entity as Products;
pub use users::Entity as Users;
