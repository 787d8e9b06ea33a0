use crate::handlers;

// User management routes.
pub fn user_router(rg: &mut RouterGroup) {
    rg.get("/health", handlers::health_handler);
    let user = rg.group("user");
    {
        let account = user.group("account");
    }
}
