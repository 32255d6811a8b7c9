use diesel::prelude::*;

use crate::domain::types::{UserId, Username};
use crate::domain::user::{NewUser, NewUserProfile, User, UserProfile};
use crate::models::user::{
    NewUser as DbNewUser, NewUserProfile as DbNewUserProfile, User as DbUser,
    UserProfile as DbUserProfile,
};
use crate::repository::{DieselRepository, RepositoryResult, UserReader, UserWriter};

impl UserReader for DieselRepository {
    fn get_user_by_username(&self, username: &Username) -> RepositoryResult<Option<User>> {
        use crate::schema::users;

        let mut conn = self.conn()?;

        let user = users::table
            .filter(users::username.eq(username.as_str()))
            .first::<DbUser>(&mut conn)
            .optional()?;

        let user = user.map(TryInto::try_into).transpose()?;
        Ok(user)
    }

    fn get_user_profile(&self, user_id: UserId) -> RepositoryResult<Option<UserProfile>> {
        use crate::schema::user_profiles;

        let mut conn = self.conn()?;

        let profile = user_profiles::table
            .filter(user_profiles::user_id.eq(user_id.get()))
            .first::<DbUserProfile>(&mut conn)
            .optional()?;

        let profile = profile.map(TryInto::try_into).transpose()?;
        Ok(profile)
    }
}

impl UserWriter for DieselRepository {
    fn create_user(&self, user: &NewUser, profile: &NewUserProfile) -> RepositoryResult<User> {
        use crate::schema::{user_profiles, users};

        let mut conn = self.conn()?;
        let db_user: DbNewUser = user.into();

        let created = conn.transaction::<_, diesel::result::Error, _>(|conn| {
            let created = diesel::insert_into(users::table)
                .values(&db_user)
                .get_result::<DbUser>(conn)?;

            diesel::insert_into(user_profiles::table)
                .values(DbNewUserProfile {
                    user_id: created.id,
                    website: profile.website.as_ref().map(|w| w.as_str()),
                    picture: profile.picture.as_deref(),
                })
                .execute(conn)?;

            Ok(created)
        })?;

        Ok(created.try_into()?)
    }
}
