use crate::db::PgPool;
use crate::errors::custom::{CustomError, DbError};
use crate::routes::products::product::Product;
use crate::routes::ApiResponse;
use crate::schema::order_items::dsl as item_dsl;
use crate::schema::orders::dsl as order_dsl;
use crate::schema::products::dsl as product_dsl;
use actix_web::{web, HttpResponse};
use chrono::NaiveDateTime;
use diesel::prelude::*;
use diesel_async::scoped_futures::ScopedFutureExt;
use diesel_async::{AsyncConnection, AsyncPgConnection, RunQueryDsl};
use serde::{Deserialize, Serialize};
use tracing::instrument;
use uuid::Uuid;

/// One line of an order as the API reports it: live product attributes
/// plus the quantity taken from the order item.
#[derive(Debug, Queryable, Serialize)]
pub struct OrderProduct {
    pub id: Uuid,
    pub name: String,
    pub price: f64,
    pub quantity: i32,
    pub stock: i32,
    pub sold: i32,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Debug, Serialize)]
pub struct OrderView {
    pub id: Uuid,
    pub products: Vec<OrderProduct>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Deserialize)]
pub struct ProductRequest {
    pub id: Uuid,
    pub quantity: i32,
}

#[derive(Deserialize)]
pub struct CreateOrderBody {
    pub products: Option<Vec<ProductRequest>>,
}

async fn order_lines(
    conn: &mut AsyncPgConnection,
    order_id: Uuid,
) -> Result<Vec<OrderProduct>, diesel::result::Error> {
    item_dsl::order_items
        .inner_join(product_dsl::products)
        .filter(item_dsl::order_id.eq(order_id))
        .select((
            product_dsl::id,
            product_dsl::name,
            product_dsl::price,
            item_dsl::quantity,
            product_dsl::stock,
            product_dsl::sold,
            product_dsl::created_at,
            product_dsl::updated_at,
        ))
        .load::<OrderProduct>(conn)
        .await
}

/******************************************/
// Reteriving All Orders
/******************************************/
/**
 * @route   GET /api/orders
 * @access  Public
 */
#[instrument(name = "List Orders", skip(pool))]
pub async fn list_orders(pool: web::Data<PgPool>) -> Result<HttpResponse, CustomError> {
    let mut conn = pool
        .get()
        .await
        .map_err(|err| CustomError::DatabaseError(DbError::ConnectionError(err.to_string())))?;

    let order_rows = order_dsl::orders
        .select((order_dsl::id, order_dsl::created_at, order_dsl::updated_at))
        .load::<(Uuid, NaiveDateTime, NaiveDateTime)>(&mut conn)
        .await
        .map_err(|err| CustomError::DatabaseError(DbError::QueryError(err.to_string())))?;

    let mut orders = Vec::with_capacity(order_rows.len());
    for (order_id, created_at, updated_at) in order_rows {
        let products = order_lines(&mut conn, order_id)
            .await
            .map_err(|err| CustomError::DatabaseError(DbError::QueryError(err.to_string())))?;
        orders.push(OrderView {
            id: order_id,
            products,
            created_at,
            updated_at,
        });
    }

    Ok(HttpResponse::Ok().json(ApiResponse {
        message: "Order List".to_string(),
        data: orders,
    }))
}

/******************************************/
// Reteriving Order using id
/******************************************/
/**
 * @route   GET /api/orders/{id}
 * @access  Public
 */
#[instrument(name = "Get Order", skip(pool))]
pub async fn get_order(
    pool: web::Data<PgPool>,
    order_id: web::Path<Uuid>,
) -> Result<HttpResponse, CustomError> {
    let mut conn = pool
        .get()
        .await
        .map_err(|err| CustomError::DatabaseError(DbError::ConnectionError(err.to_string())))?;

    let order_id = order_id.into_inner();
    let (order_id, created_at, updated_at) = order_dsl::orders
        .filter(order_dsl::id.eq(order_id))
        .select((order_dsl::id, order_dsl::created_at, order_dsl::updated_at))
        .first::<(Uuid, NaiveDateTime, NaiveDateTime)>(&mut conn)
        .await
        .optional()
        .map_err(|err| CustomError::DatabaseError(DbError::QueryError(err.to_string())))?
        .ok_or_else(|| CustomError::NotFound("Order not found".to_string()))?;

    let products = order_lines(&mut conn, order_id)
        .await
        .map_err(|err| CustomError::DatabaseError(DbError::QueryError(err.to_string())))?;

    Ok(HttpResponse::Ok().json(ApiResponse {
        message: "Order Detail".to_string(),
        data: OrderView {
            id: order_id,
            products,
            created_at,
            updated_at,
        },
    }))
}

/******************************************/
// New Order Creation route
/******************************************/
/**
 * @route   POST /api/orders
 * @access  Public
 *
 * Validates the requested lines against current stock, inserts the order and
 * its items, and moves stock/sold, all inside one transaction. Any failure
 * rolls the whole order back.
 */
#[instrument(name = "Create new Order", skip(req_order, pool))]
pub async fn create_order(
    pool: web::Data<PgPool>,
    req_order: web::Json<CreateOrderBody>,
) -> Result<HttpResponse, CustomError> {
    let lines = match req_order.into_inner().products {
        Some(lines) if !lines.is_empty() => lines,
        _ => {
            return Err(CustomError::ValidationError(
                "Invalid input, products array is required.".to_string(),
            ))
        }
    };

    let mut conn = pool
        .get()
        .await
        .map_err(|err| CustomError::DatabaseError(DbError::ConnectionError(err.to_string())))?;

    let order_id = Uuid::new_v4();
    let now = chrono::Utc::now().naive_utc();

    let inserted_products = conn
        .transaction::<Vec<OrderProduct>, CustomError, _>(|conn| {
            async move {
                diesel::insert_into(order_dsl::orders)
                    .values((
                        order_dsl::id.eq(order_id),
                        order_dsl::created_at.eq(now),
                        order_dsl::updated_at.eq(now),
                    ))
                    .execute(conn)
                    .await?;

                let mut inserted_products = Vec::with_capacity(lines.len());
                for line in &lines {
                    // FOR UPDATE serializes concurrent placements touching the
                    // same product row, so stock/sold cannot be lost-updated.
                    let product = product_dsl::products
                        .filter(product_dsl::id.eq(line.id))
                        .select(Product::as_select())
                        .for_update()
                        .first::<Product>(conn)
                        .await
                        .optional()?
                        .ok_or_else(|| {
                            CustomError::NotFound(format!(
                                "Product with id {} not found.",
                                line.id
                            ))
                        })?;

                    if product.stock < line.quantity {
                        return Err(CustomError::InsufficientStock(format!(
                            "Insufficient stock for product {}",
                            line.id
                        )));
                    }

                    // price snapshot: the item keeps the price as sold, later
                    // product price changes do not rewrite history
                    diesel::insert_into(item_dsl::order_items)
                        .values((
                            item_dsl::id.eq(Uuid::new_v4()),
                            item_dsl::order_id.eq(order_id),
                            item_dsl::product_id.eq(line.id),
                            item_dsl::quantity.eq(line.quantity),
                            item_dsl::price.eq(product.price),
                        ))
                        .execute(conn)
                        .await?;

                    let new_stock = product.stock - line.quantity;
                    let new_sold = product.sold + line.quantity;
                    diesel::update(
                        product_dsl::products.filter(product_dsl::id.eq(line.id)),
                    )
                    .set((
                        product_dsl::stock.eq(new_stock),
                        product_dsl::sold.eq(new_sold),
                        product_dsl::updated_at.eq(now),
                    ))
                    .execute(conn)
                    .await?;

                    inserted_products.push(OrderProduct {
                        id: product.id,
                        name: product.name,
                        price: product.price,
                        quantity: line.quantity,
                        stock: new_stock,
                        sold: new_sold,
                        created_at: product.created_at,
                        updated_at: now,
                    });
                }

                Ok(inserted_products)
            }
            .scope_boxed()
        })
        .await?;

    Ok(HttpResponse::Created().json(ApiResponse {
        message: "Order created".to_string(),
        data: OrderView {
            id: order_id,
            products: inserted_products,
            created_at: now,
            updated_at: now,
        },
    }))
}

/******************************************/
// Order Deletion route
/******************************************/
/**
 * @route   DELETE /api/orders/{id}
 * @access  Public
 *
 * Items go with the order (cascade). Stock and sold counters are not
 * restored.
 */
#[instrument(name = "Delete Order", skip(pool))]
pub async fn delete_order(
    pool: web::Data<PgPool>,
    order_id: web::Path<Uuid>,
) -> Result<HttpResponse, CustomError> {
    let mut conn = pool
        .get()
        .await
        .map_err(|err| CustomError::DatabaseError(DbError::ConnectionError(err.to_string())))?;

    let order_id = order_id.into_inner();
    let (order_id, created_at, updated_at) = order_dsl::orders
        .filter(order_dsl::id.eq(order_id))
        .select((order_dsl::id, order_dsl::created_at, order_dsl::updated_at))
        .first::<(Uuid, NaiveDateTime, NaiveDateTime)>(&mut conn)
        .await
        .optional()
        .map_err(|err| CustomError::DatabaseError(DbError::QueryError(err.to_string())))?
        .ok_or_else(|| CustomError::NotFound("Order not found".to_string()))?;

    let products = order_lines(&mut conn, order_id)
        .await
        .map_err(|err| CustomError::DatabaseError(DbError::QueryError(err.to_string())))?;

    diesel::delete(order_dsl::orders.filter(order_dsl::id.eq(order_id)))
        .execute(&mut conn)
        .await
        .map_err(|err| CustomError::DatabaseError(DbError::QueryError(err.to_string())))?;

    Ok(HttpResponse::Ok().json(ApiResponse {
        message: "Order deleted successfully".to_string(),
        data: OrderView {
            id: order_id,
            products,
            created_at,
            updated_at,
        },
    }))
}
