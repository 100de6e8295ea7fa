use actix_web::web::{self};

pub mod routes {
    pub mod pay;
}

mod services {
    pub(crate) mod pay;
}

mod dtos {
    pub(crate) mod pay;
}

pub fn mount_payment() -> actix_web::Scope {
    web::scope("/payment")
        .service(routes::pay::post_create_order)
        .service(routes::pay::post_verify)
}
