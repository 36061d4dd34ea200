use crate::db::PgPool;
use crate::errors::custom::{CustomError, DbError};
use crate::routes::ApiResponse;
use crate::schema::products::dsl as product_dsl;
use crate::validations::product_name::ProductName;
use actix_web::{web, HttpResponse};
use chrono::NaiveDateTime;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use serde::Deserialize;
use serde::Serialize;
use tracing::instrument;
use uuid::Uuid;

#[derive(Debug, Clone, Queryable, Selectable, Serialize)]
#[diesel(table_name = crate::schema::products)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct Product {
    pub id: Uuid,
    pub name: String,
    pub price: f64,
    pub stock: i32,
    pub sold: i32,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Deserialize)]
pub struct CreateProductBody {
    pub name: Option<String>,
    pub price: Option<f64>,
    pub stock: Option<i32>,
}

/******************************************/
// Reteriving All Products
/******************************************/
/**
 * @route   GET /api/products
 * @access  Public
 */
#[instrument(name = "List products", skip(pool))]
pub async fn list_products(pool: web::Data<PgPool>) -> Result<HttpResponse, CustomError> {
    let mut conn = pool
        .get()
        .await
        .map_err(|err| CustomError::DatabaseError(DbError::ConnectionError(err.to_string())))?;

    let products = product_dsl::products
        .select(Product::as_select())
        .load::<Product>(&mut conn)
        .await
        .map_err(|err| CustomError::DatabaseError(DbError::QueryError(err.to_string())))?;

    Ok(HttpResponse::Ok().json(ApiResponse {
        message: "Product List".to_string(),
        data: products,
    }))
}

/******************************************/
// Reteriving Product using id
/******************************************/
/**
 * @route   GET /api/products/{id}
 * @access  Public
 */
#[instrument(name = "Get Product", skip(pool))]
pub async fn get_product(
    pool: web::Data<PgPool>,
    product_id: web::Path<Uuid>,
) -> Result<HttpResponse, CustomError> {
    let mut conn = pool
        .get()
        .await
        .map_err(|err| CustomError::DatabaseError(DbError::ConnectionError(err.to_string())))?;

    let product = product_dsl::products
        .filter(product_dsl::id.eq(product_id.into_inner()))
        .select(Product::as_select())
        .first::<Product>(&mut conn)
        .await
        .optional()
        .map_err(|err| CustomError::DatabaseError(DbError::QueryError(err.to_string())))?
        .ok_or_else(|| CustomError::NotFound("Product not found".to_string()))?;

    Ok(HttpResponse::Ok().json(ApiResponse {
        message: "Product Detail".to_string(),
        data: product,
    }))
}

/******************************************/
// New Product Creation route
/******************************************/
/**
 * @route   POST /api/products
 * @access  Public
 */
#[instrument(name = "Create new Product", skip(req_product, pool))]
pub async fn create_product(
    pool: web::Data<PgPool>,
    req_product: web::Json<CreateProductBody>,
) -> Result<HttpResponse, CustomError> {
    let product_data = req_product.into_inner();
    let (name, price, stock) = match (product_data.name, product_data.price, product_data.stock) {
        (Some(name), Some(price), Some(stock)) if !name.trim().is_empty() => (name, price, stock),
        _ => {
            return Err(CustomError::ValidationError(
                "Name, price, and stock are required".to_string(),
            ))
        }
    };
    let validated_name =
        ProductName::parse(name).map_err(|err| CustomError::ValidationError(err.to_string()))?;

    let mut conn = pool
        .get()
        .await
        .map_err(|err| CustomError::DatabaseError(DbError::ConnectionError(err.to_string())))?;

    let product_id = Uuid::new_v4();
    let now = chrono::Utc::now().naive_utc();
    let product = diesel::insert_into(product_dsl::products)
        .values((
            product_dsl::id.eq(product_id),
            product_dsl::name.eq(validated_name.as_ref()),
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

    Ok(HttpResponse::Created().json(ApiResponse {
        message: "Product created successfully".to_string(),
        data: product,
    }))
}

/******************************************/
// Product Updation route
/******************************************/
/**
 * @route   PUT /api/products/{id}
 * @access  Public
 */
#[instrument(name = "Update Product", skip(req_product, pool))]
pub async fn update_product(
    pool: web::Data<PgPool>,
    product_id: web::Path<Uuid>,
    req_product: web::Json<CreateProductBody>,
) -> Result<HttpResponse, CustomError> {
    let product_data = req_product.into_inner();
    let (name, price, stock) = match (product_data.name, product_data.price, product_data.stock) {
        (Some(name), Some(price), Some(stock)) if !name.trim().is_empty() => (name, price, stock),
        _ => {
            return Err(CustomError::ValidationError(
                "Invalid input, name, price, and stock are required.".to_string(),
            ))
        }
    };
    let validated_name =
        ProductName::parse(name).map_err(|err| CustomError::ValidationError(err.to_string()))?;

    let mut conn = pool
        .get()
        .await
        .map_err(|err| CustomError::DatabaseError(DbError::ConnectionError(err.to_string())))?;

    let product_id = product_id.into_inner();
    let existing = product_dsl::products
        .filter(product_dsl::id.eq(product_id))
        .select(Product::as_select())
        .first::<Product>(&mut conn)
        .await
        .optional()
        .map_err(|err| CustomError::DatabaseError(DbError::QueryError(err.to_string())))?;
    if existing.is_none() {
        return Err(CustomError::NotFound("Product not found".to_string()));
    }

    // `sold` is deliberately left alone, only the order transaction moves it
    let now = chrono::Utc::now().naive_utc();
    let product = diesel::update(product_dsl::products.filter(product_dsl::id.eq(product_id)))
        .set((
            product_dsl::name.eq(validated_name.as_ref()),
            product_dsl::price.eq(price),
            product_dsl::stock.eq(stock),
            product_dsl::updated_at.eq(now),
        ))
        .returning(Product::as_returning())
        .get_result::<Product>(&mut conn)
        .await
        .map_err(|err| CustomError::DatabaseError(DbError::UpdationError(err.to_string())))?;

    Ok(HttpResponse::Ok().json(ApiResponse {
        message: "Product updated successfully".to_string(),
        data: product,
    }))
}

/******************************************/
// Product Deletion route
/******************************************/
/**
 * @route   DELETE /api/products/{id}
 * @access  Public
 */
#[instrument(name = "Delete Product", skip(pool))]
pub async fn delete_product(
    pool: web::Data<PgPool>,
    product_id: web::Path<Uuid>,
) -> Result<HttpResponse, CustomError> {
    let mut conn = pool
        .get()
        .await
        .map_err(|err| CustomError::DatabaseError(DbError::ConnectionError(err.to_string())))?;

    let product_id = product_id.into_inner();
    let product = product_dsl::products
        .filter(product_dsl::id.eq(product_id))
        .select(Product::as_select())
        .first::<Product>(&mut conn)
        .await
        .optional()
        .map_err(|err| CustomError::DatabaseError(DbError::QueryError(err.to_string())))?
        .ok_or_else(|| CustomError::NotFound("Product not found".to_string()))?;

    diesel::delete(product_dsl::products.filter(product_dsl::id.eq(product_id)))
        .execute(&mut conn)
        .await
        .map_err(|err| CustomError::DatabaseError(DbError::QueryError(err.to_string())))?;

    Ok(HttpResponse::Ok().json(ApiResponse {
        message: "Product deleted successfully".to_string(),
        data: product,
    }))
}
