use crate::db::PgPool;
use crate::errors::custom::{CustomError, DbError};
use crate::routes::products::product::Product;
use crate::schema::products::dsl as product_dsl;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use uuid::Uuid;

/******************************************/
// Adding seed data to products table
/******************************************/
pub async fn seed_products(pool: &PgPool) -> Result<Vec<Product>, CustomError> {
    let data = vec![
        (Uuid::new_v4(), "Laptop".to_string(), 50000.0, 10),
        (Uuid::new_v4(), "Smart Phone".to_string(), 20000.0, 25),
        (Uuid::new_v4(), "Dress".to_string(), 5000.0, 40),
        (Uuid::new_v4(), "Bottle".to_string(), 1000.0, 100),
        (Uuid::new_v4(), "Cap".to_string(), 500.0, 60),
    ];

    let mut conn = pool
        .get()
        .await
        .map_err(|err| CustomError::DatabaseError(DbError::ConnectionError(err.to_string())))?;

    let now = chrono::Utc::now().naive_utc();
    let mut seeded = Vec::with_capacity(data.len());
    for (id, name, price, stock) in data {
        let product = diesel::insert_into(product_dsl::products)
            .values((
                product_dsl::id.eq(id),
                product_dsl::name.eq(name),
                product_dsl::price.eq(price),
                product_dsl::stock.eq(stock),
                product_dsl::sold.eq(0),
                product_dsl::created_at.eq(now),
                product_dsl::updated_at.eq(now),
            ))
            .returning(Product::as_returning())
            .get_result::<Product>(&mut conn)
            .await
            .map_err(|err| CustomError::DatabaseError(DbError::InsertionError(err.to_string())))?;
        seeded.push(product);
    }

    Ok(seeded)
}
