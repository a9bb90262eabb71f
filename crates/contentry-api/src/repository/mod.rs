//! UserStore의 영속성 구현.
//!
//! 데이터베이스 접근 로직을 라우트 핸들러에서 분리하여 관리합니다.
//! 저장소는 `contentry_core::UserStore` 계약을 구현하며, 읽기는 항상
//! 역할이 포함된 투영을 반환합니다.

pub mod users;

pub use users::PgUserStore;
