pub mod category;
pub mod product;

pub use category::{Category, CategoryInput, CategoryUpdate};
pub use product::{
    Counter, Gender, NewProduct, Product, ProductFilter, ProductSummary, ProductUpdate,
    ADMIN_PAGE_SIZE, DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE,
};
