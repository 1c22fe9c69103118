//! Shared fixtures for integration tests: a small but complete set of
//! input tables with known aggregate outcomes.

use std::fs;
use std::path::Path;

/// Writes all four cleaned input tables into `dir`.
///
/// The scenario is deliberate:
/// - Action playtime peaks in 2012 (700) over 2015 (400), and u1 is the
///   heaviest Action user (600 across 2012 and 2015).
/// - Reviews in 2014 give a full recommended top-3 with a tie at count 2,
///   while the not-recommended side has only two titles.
/// - Sentiment rows cover 2012 and 2013 with known label counts.
pub fn write_input_tables(dir: &Path) {
    fs::write(
        dir.join("steam_games.csv"),
        "id,title,genres,tags,price,developer,release_date\n\
         1,Alpha Strike,\"['Action']\",\"['Shooter']\",9.99,Valve,2012-05-01\n\
         2,Beta Blast,\"['Action']\",\"['Shooter']\",14.99,Valve,2015-03-10\n\
         3,Gamma Quest,\"['Adventure']\",\"['Story']\",19.99,Obsidian,2012-07-07\n\
         4,Delta Farm,\"['Farming']\",\"['Cozy']\",12.49,ConcernedApe,2016-02-26\n\
         5,Epsilon Wars,\"['Strategy']\",\"['Tactics']\",29.99,Firaxis,2015-01-01\n\
         6,Zeta Drift,\"['Action']\",\"['Racing']\",4.99,Codemasters,2015-06-01\n\
         7,Eta Colony,\"['Strategy']\",\"['Colony']\",24.99,Ludeon,2013-01-01\n",
    )
    .unwrap();

    fs::write(
        dir.join("users_items.csv"),
        "user_id,id,item_name,playtime_forever\n\
         u1,1,Alpha Strike,500\n\
         u2,1,Alpha Strike,200\n\
         u2,2,Beta Blast,300\n\
         u1,6,Zeta Drift,100\n\
         u3,3,Gamma Quest,250\n\
         u3,5,Epsilon Wars,700\n\
         u1,7,Eta Colony,100\n\
         u3,4,Delta Farm,50\n",
    )
    .unwrap();

    fs::write(
        dir.join("users_reviews.csv"),
        "user_id,item_id,posted,recommend\n\
         u1,1,2014-01-05,True\n\
         u2,1,2014-01-06,True\n\
         u3,1,2014-01-07,True\n\
         u1,2,2014-02-01,True\n\
         u2,2,2014-02-02,True\n\
         u1,3,2014-03-01,True\n\
         u2,3,2014-03-02,True\n\
         u3,6,2014-04-01,True\n\
         u1,4,2014-05-01,False\n\
         u2,5,2014-05-02,False\n",
    )
    .unwrap();

    fs::write(
        dir.join("users_sentiment.csv"),
        "item_id,posted,sentiment_analysis\n\
         1,2012-01-05,2\n\
         2,2012-02-06,2\n\
         3,2012-03-07,0\n\
         4,2013-04-08,1\n",
    )
    .unwrap();
}
