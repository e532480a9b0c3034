// Two security tiers: public (no auth, /api/auth/register|login|refresh)
// and protected (JWT required, /api/*).
pub mod protected;
pub mod public;
