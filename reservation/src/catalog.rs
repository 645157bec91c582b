use abi::{
    join_amenities, Error, NewRoom, NewServiceItem, Room, RoomId, RoomStatus, RoomType,
    ServiceItem, Validator,
};
use async_trait::async_trait;
use tracing::info;

use crate::{Catalog, ReservationManager};

#[async_trait]
impl Catalog for ReservationManager {
    async fn create_room(&self, room: NewRoom) -> Result<Room, Error> {
        room.validate()?;
        let room: Room = sqlx::query_as(
            r#"
            INSERT INTO hotel.rooms (number, room_type, price, status, capacity, amenities, description)
            VALUES ($1, $2::hotel.room_type, $3, $4::hotel.room_status, $5, $6, $7)
            RETURNING id, number, room_type::text AS room_type, price, status::text AS status,
                      capacity, amenities, description
            "#,
        )
        .bind(room.number.trim())
        .bind(room.room_type.to_string())
        .bind(room.price)
        .bind(room.status.to_string())
        .bind(room.capacity)
        .bind(join_amenities(&room.amenities))
        .bind(&room.description)
        .fetch_one(&self.pool)
        .await?;

        info!(room = room.id, number = %room.number, "room created");
        Ok(room)
    }

    async fn get_room(&self, id: RoomId) -> Result<Room, Error> {
        sqlx::query_as(
            r#"
            SELECT id, number, room_type::text AS room_type, price, status::text AS status,
                   capacity, amenities, description
            FROM hotel.rooms
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(Error::RoomNotFound(id))
    }

    async fn list_rooms(
        &self,
        room_type: Option<RoomType>,
        status: Option<RoomStatus>,
    ) -> Result<Vec<Room>, Error> {
        let rooms = sqlx::query_as(
            r#"
            SELECT id, number, room_type::text AS room_type, price, status::text AS status,
                   capacity, amenities, description
            FROM hotel.rooms
            WHERE ($1::text IS NULL OR room_type::text = $1)
              AND ($2::text IS NULL OR status::text = $2)
            ORDER BY number
            "#,
        )
        .bind(room_type.map(|t| t.to_string()))
        .bind(status.map(|s| s.to_string()))
        .fetch_all(&self.pool)
        .await?;
        Ok(rooms)
    }

    async fn update_room(&self, id: RoomId, room: NewRoom) -> Result<Room, Error> {
        room.validate()?;
        sqlx::query_as(
            r#"
            UPDATE hotel.rooms
            SET number = $2, room_type = $3::hotel.room_type, price = $4,
                status = $5::hotel.room_status, capacity = $6, amenities = $7, description = $8
            WHERE id = $1
            RETURNING id, number, room_type::text AS room_type, price, status::text AS status,
                      capacity, amenities, description
            "#,
        )
        .bind(id)
        .bind(room.number.trim())
        .bind(room.room_type.to_string())
        .bind(room.price)
        .bind(room.status.to_string())
        .bind(room.capacity)
        .bind(join_amenities(&room.amenities))
        .bind(&room.description)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(Error::RoomNotFound(id))
    }

    async fn delete_room(&self, id: RoomId) -> Result<(), Error> {
        let active: bool = sqlx::query_scalar(
            r#"
            SELECT EXISTS (
                SELECT 1 FROM hotel.reservations
                WHERE room_id = $1 AND (status = 'pending' OR status = 'confirmed')
            )
            "#,
        )
        .bind(id)
        .fetch_one(&self.pool)
        .await?;
        if active {
            return Err(Error::RoomHasActiveReservations);
        }

        let deleted = sqlx::query("DELETE FROM hotel.rooms WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?
            .rows_affected();
        if deleted == 0 {
            return Err(Error::RoomNotFound(id));
        }

        info!(room = id, "room deleted");
        Ok(())
    }

    async fn list_services(&self) -> Result<Vec<ServiceItem>, Error> {
        let services = sqlx::query_as(
            "SELECT id, name, description, price, category FROM hotel.services ORDER BY name",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(services)
    }

    async fn create_service(&self, service: NewServiceItem) -> Result<ServiceItem, Error> {
        service.validate()?;
        let category = match service.category.trim() {
            "" => "General",
            category => category,
        };
        let service = sqlx::query_as(
            r#"
            INSERT INTO hotel.services (name, description, price, category)
            VALUES ($1, $2, $3, $4)
            RETURNING id, name, description, price, category
            "#,
        )
        .bind(service.name.trim())
        .bind(&service.description)
        .bind(service.price)
        .bind(category)
        .fetch_one(&self.pool)
        .await?;
        Ok(service)
    }
}
